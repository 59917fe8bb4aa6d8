use crate::infra::load_service;
use bto_housing::config::AppConfig;
use bto_housing::error::AppError;
use bto_housing::workflows::housing::{
    import_projects_csv, JsonFileSnapshotStore, ProjectImport,
};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV sheet with one project per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Snapshot file to import into (defaults to BTO_SNAPSHOT_PATH)
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
}

/// Parse the sheet and, when a snapshot is available, create the projects and save it.
/// Without a snapshot the rows are only validated and listed.
pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let imports = import_projects_csv(File::open(&args.csv)?)?;

    let Some(path) = args.snapshot.or(config.storage.snapshot_path) else {
        println!("Parsed {} project(s) (no snapshot configured, nothing saved)", imports.len());
        render_rows(&imports);
        return Ok(());
    };

    let store = JsonFileSnapshotStore::new(path);
    let service = load_service(Some(&store), config.policy)?;
    let created = service.import_projects(imports)?;
    service.persist(&store)?;

    println!(
        "Imported {} project(s) into {}",
        created.len(),
        store.path().display()
    );
    for project in &created {
        println!(
            "  {} {} ({} to {})",
            project.id, project.name, project.window.opens, project.window.closes
        );
    }
    Ok(())
}

fn render_rows(imports: &[ProjectImport]) {
    for import in imports {
        println!(
            "  {} in {} managed by {}",
            import.draft.name, import.draft.neighbourhood, import.manager
        );
    }
}
