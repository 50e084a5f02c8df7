use super::print_state;
use colored::Colorize;
use restflow_core::ApiObjectResource;

pub async fn handle(resource: &ApiObjectResource, import_id: &str) -> anyhow::Result<()> {
    eprintln!("{} {}", "インポート中...".blue(), import_id);
    let state = resource.import(import_id).await?;
    print_state("インポートしました", &state)
}
