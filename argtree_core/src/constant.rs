pub(crate) const HELP_NAMES: &str = "-h,--help";
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";
pub(crate) const POSITIONAL_MARK: &str = "--";
pub(crate) const DEFAULT_SECTION: &str = "default";
pub(crate) const JOIN_SEPARATOR: &str = "\n";
