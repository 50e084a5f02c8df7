use super::print_state;
use colored::Colorize;
use restflow_core::{ApiObjectResource, ResourceSpec};

pub async fn create(resource: &ApiObjectResource, spec: &ResourceSpec) -> anyhow::Result<()> {
    let state = resource.create(spec).await?;
    print_state("作成しました", &state)
}

pub async fn read(resource: &ApiObjectResource, spec: &ResourceSpec) -> anyhow::Result<()> {
    let state = resource.read(spec).await?;
    print_state("読み込みました", &state)
}

pub async fn update(resource: &ApiObjectResource, spec: &ResourceSpec) -> anyhow::Result<()> {
    let state = resource.update(spec).await?;
    print_state("更新しました", &state)
}

pub async fn delete(resource: &ApiObjectResource, spec: &ResourceSpec) -> anyhow::Result<()> {
    resource.delete(spec).await?;
    eprintln!(
        "{} {}/{}",
        "✓ 削除しました".green().bold(),
        spec.path.cyan(),
        spec.id.cyan()
    );
    Ok(())
}

pub async fn exists(resource: &ApiObjectResource, spec: &ResourceSpec) -> anyhow::Result<()> {
    let exists = resource.exists(spec).await?;
    if exists {
        eprintln!("{} {}/{}", "✓ 存在します".green(), spec.path, spec.id);
    } else {
        eprintln!("{} {}/{}", "✗ 存在しません".yellow(), spec.path, spec.id);
    }
    println!("{}", exists);
    Ok(())
}
