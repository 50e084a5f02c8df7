pub mod error;

pub use error::*;

use restflow_core::ClientConfig;
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 2] = ["restflow.local.yaml", "restflow.yaml"];

/// プロジェクトの restflow.yaml ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 RESTFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: restflow.local.yaml, restflow.yaml
/// 3. ./.restflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/restflow/restflow.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("RESTFLOW_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.restflow/ ディレクトリで検索
    let local_dir = current_dir.join(".restflow");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル (~/.config/restflow/restflow.yaml)
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("restflow").join("restflow.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// YAML 設定ファイルを読み込む
pub fn load_config_file(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 環境変数で設定を上書き
///
/// REST_API_URI, REST_API_USERNAME, REST_API_PASSWORD, REST_API_COPY_KEYS (カンマ区切り)
pub fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(uri) = std::env::var("REST_API_URI") {
        config.uri = uri;
    }
    if let Ok(username) = std::env::var("REST_API_USERNAME") {
        config.username = Some(username);
    }
    if let Ok(password) = std::env::var("REST_API_PASSWORD") {
        config.password = Some(password);
    }
    if let Ok(keys) = std::env::var("REST_API_COPY_KEYS") {
        config.copy_keys = keys
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .collect();
    }
}

/// クライアント設定をロード
///
/// `explicit` が指定されていればそのファイルのみを読む。未指定の場合は
/// [`find_config_file`] で探し、見つからなくても REST_API_URI があれば
/// 環境変数だけで設定を組み立てる。
pub fn load_client_config(explicit: Option<&Path>) -> Result<ClientConfig> {
    let mut config = match explicit {
        Some(path) => load_config_file(path)?,
        None => match find_config_file() {
            Ok(path) => {
                tracing::debug!("設定ファイル: {}", path.display());
                load_config_file(&path)?
            }
            Err(ConfigError::ConfigFileNotFound) if std::env::var("REST_API_URI").is_ok() => {
                ClientConfig::new("")
            }
            Err(e) => return Err(e),
        },
    };

    apply_env_overrides(&mut config);

    if config.uri.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "uri が設定されていません".to_string(),
        ));
    }

    Ok(config)
}
