//! Human-readable report rendering
//!
//! Line formats follow the catalog's Chinese presentation: availability
//! glyph, name padded to 30 columns, latency with one decimal or the
//! 不可用 (unavailable) marker.

use crate::models::ProbeResult;
use crate::registry::GroupedServers;

/// One progress line for a completed probe
///
/// Format: `[<done>/<total>] <✓|✗> <name> <latency>ms` or `... 不可用`.
pub fn progress_line(done: usize, total: usize, result: &ProbeResult) -> String {
    match (result.available, result.latency_ms) {
        (true, Some(latency)) => {
            format!("[{done}/{total}] ✓ {:<30} {latency:.1}ms", result.name())
        }
        _ => format!("[{done}/{total}] ✗ {:<30} 不可用", result.name()),
    }
}

/// Render the full grouped report, one region and category at a time
pub fn render_grouped(grouped: &GroupedServers) -> String {
    let mut out = String::new();

    for region_group in &grouped.regions {
        out.push_str(&format!(
            "\n=== {}NTP服务器 ===\n",
            region_group.region.label()
        ));

        for category in &region_group.categories {
            out.push_str(&format!("\n【{}】\n", category.name));

            for server in &category.servers {
                out.push_str(&server_line(server));
                out.push('\n');
            }
        }
    }

    out
}

/// One indented server line within the grouped report
fn server_line(result: &ProbeResult) -> String {
    match (result.available, result.latency_ms) {
        (true, Some(latency)) => format!("  ✓ {:<30} {latency:.1}ms", result.name()),
        _ => format!("  ✗ {:<30} 不可用", result.name()),
    }
}
