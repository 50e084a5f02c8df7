mod commands;

use clap::{Args, Parser, Subcommand};
use restflow_core::{ApiClient, ApiObjectResource, ResourceSpec};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restflow")]
#[command(about = "REST API のオブジェクトを宣言的なリソースとして管理する", long_about = None)]
struct Cli {
    /// 設定ファイルのパス（省略時は restflow.yaml を探索）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 詳細なデバッグ出力を有効にする
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// 既存オブジェクトを指定する引数
#[derive(Args)]
struct ItemArgs {
    /// コレクションのパス（例: /widgets）
    #[arg(short, long)]
    path: String,
    /// オブジェクトID
    #[arg(short, long)]
    id: String,
    /// URL拡張子（例: .json）
    #[arg(long, default_value = "")]
    ext: String,
}

impl ItemArgs {
    fn spec(&self, data: &str, debug: bool) -> ResourceSpec {
        ResourceSpec::new(self.path.as_str(), data)
            .with_id(self.id.as_str())
            .with_ext(self.ext.as_str())
            .with_debug(debug)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// オブジェクトを作成（コレクションへ POST）
    Create {
        /// コレクションのパス（例: /widgets）
        #[arg(short, long)]
        path: String,
        /// 管理するJSONデータ
        #[arg(long)]
        data: String,
        /// 既知のオブジェクトID（サーバーが返すIDが優先される）
        #[arg(short, long, default_value = "")]
        id: String,
        /// URL拡張子（例: .json）
        #[arg(long, default_value = "")]
        ext: String,
    },
    /// オブジェクトを読み込む
    Read {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// オブジェクトを更新（PUT）
    Update {
        #[command(flatten)]
        item: ItemArgs,
        /// 管理するJSONデータ
        #[arg(long)]
        data: String,
    },
    /// オブジェクトを削除（存在しない場合も成功）
    Delete {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// オブジェクトの存在を確認
    Exists {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// 既存オブジェクトをインポート
    Import {
        /// <パス>/<ID> 形式（例: /widgets/42）
        import_id: String,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrへ。stdoutは状態のJSON出力に使う
    let filter = if cli.debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("restflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = restflow_config::load_client_config(cli.config.as_deref())?;
    config.debug |= cli.debug;
    let resource = ApiObjectResource::new(ApiClient::new(config)?);

    match cli.command {
        Commands::Create {
            path,
            data,
            id,
            ext,
        } => {
            let spec = ResourceSpec::new(path, data)
                .with_id(id)
                .with_ext(ext)
                .with_debug(cli.debug);
            commands::object::create(&resource, &spec).await?;
        }
        Commands::Read { item } => {
            commands::object::read(&resource, &item.spec("", cli.debug)).await?;
        }
        Commands::Update { item, data } => {
            commands::object::update(&resource, &item.spec(&data, cli.debug)).await?;
        }
        Commands::Delete { item } => {
            commands::object::delete(&resource, &item.spec("", cli.debug)).await?;
        }
        Commands::Exists { item } => {
            commands::object::exists(&resource, &item.spec("", cli.debug)).await?;
        }
        Commands::Import { import_id } => {
            commands::import::handle(&resource, &import_id).await?;
        }
        Commands::Version => {}
    }

    Ok(())
}
