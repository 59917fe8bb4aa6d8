mod applications;
mod common;
mod concurrency;
mod eligibility;
