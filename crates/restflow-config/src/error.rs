use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: restflow.local.yaml, restflow.yaml\n\
        - ./.restflow/ ディレクトリ\n\
        - ~/.config/restflow/restflow.yaml\n\
        または RESTFLOW_CONFIG_PATH 環境変数で直接指定できます\n\
        (REST_API_URI だけを設定しても動作します)"
    )]
    ConfigFileNotFound,

    #[error("設定ファイルの解析に失敗しました: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
