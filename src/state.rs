use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    auth::{jwt::TokenCodec, repo::PgUserRepo, repo::UserRepo},
    config::AppConfig,
    db,
    memory::MemoryStore,
    products::repo::{PgProductRepo, ProductRepo},
    storage::{Storage, StorageClient},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub products: Arc<dyn ProductRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub tokens: TokenCodec,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let (users, products): (Arc<dyn UserRepo>, Arc<dyn ProductRepo>) =
            match &config.database_url {
                Some(url) => {
                    let pool = db::connect(url).await?;
                    db::migrate(&pool).await?;
                    info!("using postgres store");
                    (
                        Arc::new(PgUserRepo::new(pool.clone())) as Arc<dyn UserRepo>,
                        Arc::new(PgProductRepo::new(pool)) as Arc<dyn ProductRepo>,
                    )
                }
                None => {
                    warn!("DATABASE_URL not set; data lives in memory and is lost on restart");
                    let store = Arc::new(MemoryStore::new());
                    (store.clone() as Arc<dyn UserRepo>, store as Arc<dyn ProductRepo>)
                }
            };

        let storage = Arc::new(Storage::new(&config.upload).await?) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(config, users, products, storage))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        products: Arc<dyn ProductRepo>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        let tokens = TokenCodec::from_config(&config.jwt);
        Self {
            config,
            users,
            products,
            storage,
            tokens,
        }
    }
}
