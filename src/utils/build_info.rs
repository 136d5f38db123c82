//! Build metadata captured by `build.rs`.

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
}

pub fn current() -> BuildInfo {
    BuildInfo {
        version: CLI_VERSION,
        git_hash: env!("INVEST_BUDGET_BUILD_HASH"),
        git_status: env!("INVEST_BUDGET_BUILD_STATUS"),
        timestamp: env!("INVEST_BUDGET_BUILD_TIMESTAMP"),
        target: env!("INVEST_BUDGET_BUILD_TARGET"),
        profile: env!("INVEST_BUDGET_BUILD_PROFILE"),
    }
}
