use camino::Utf8Path;
use tracing::{debug, info};
use treepack_walker::relative_within;

use crate::{Config, RuleMatcher, Selection, TreepackError, Walker};

/// Walk the configured start directory, leaving out `own_output` when it
/// lies inside it.
///
/// The rules in effect are logged first; `None` for `own_output` means the
/// result goes to stdout.
pub(super) fn select(
    config: &Config,
    own_output: Option<&Utf8Path>,
) -> Result<Selection, TreepackError> {
    log_run_config(config, own_output);

    let matcher = RuleMatcher::new(&config.selectors)?;
    let mut walker = Walker::new(config.start_dir(), &matcher);

    if let Some(rel) = own_output.and_then(|out| relative_within(config.start_dir(), out)) {
        debug!(path = %rel, "excluding this run's output from the selection");
        walker = walker.skip_path(rel);
    }

    walker.walk()
}

fn log_run_config(config: &Config, own_output: Option<&Utf8Path>) {
    let rules = &config.selectors;
    info!(
        start_dir = %config.start_dir(),
        output = %own_output.map_or("stdout", Utf8Path::as_str),
        extensions = %rules.extensions.join(","),
        exclude_dirs = %rules.exclude_dirs.join(","),
        exclude_files = %rules.exclude_files.join(","),
        include = %rules.include.join(","),
        "effective configuration"
    );
}
