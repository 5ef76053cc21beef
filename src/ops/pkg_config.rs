//! Generation of the `gazebo.pc` library discovery descriptor.

use std::path::Path;

use anyhow::Result;

use crate::util::fs::write_string;

/// Render the descriptor for an install `prefix`.
///
/// `prefix` is written as-is; it must not contain newlines.
pub fn render_discovery_descriptor(prefix: &str, version: &str) -> String {
    format!(
        "prefix={prefix}\n\
         Name: gazebo\n\
         Description: Simplified interface to Player\n\
         Version:{version}\n\
         Requires:\n\
         Libs: -L{prefix}/lib -lgazeboServer\n\
         Cflags: -I{prefix}/include\n"
    )
}

/// Write the descriptor to `target`, replacing any previous content.
pub fn generate_discovery_descriptor(target: &Path, prefix: &str, version: &str) -> Result<()> {
    tracing::debug!("writing discovery descriptor {}", target.display());
    write_string(target, &render_discovery_descriptor(prefix, version))
}
