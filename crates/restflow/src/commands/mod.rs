pub mod import;
pub mod object;

use colored::Colorize;
use restflow_core::ResourceState;

/// 状態をstdoutにJSONで出力し、サマリーをstderrに表示
pub fn print_state(action: &str, state: &ResourceState) -> anyhow::Result<()> {
    eprintln!(
        "{} {} {}",
        format!("✓ {}", action).green().bold(),
        state.path.cyan(),
        format!("(id: {})", state.id).dimmed()
    );
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}
