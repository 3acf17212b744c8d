use crate::config::db::MongoConfig;
use crate::config::environment::AppConfig;
use mongodb::Client as MongoClient;
use mongodb::Database;
use mongodb::IndexModel;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;

#[derive(Debug, Clone)]
pub struct InfraClients {
    pub mongo_db: Database,
}

pub const RECORDS_COLLECTION: &str = "users";

pub async fn init_infra(config: &AppConfig) -> Result<Option<InfraClients>, String> {
    let Some(mongo) = MongoConfig::from_app(config) else {
        return Ok(None);
    };

    let mongo_client = MongoClient::with_uri_str(&mongo.url)
        .await
        .map_err(|e| format!("mongodb client init failed: {e}"))?;
    let mongo_db = mongo_client.database(&mongo.database);
    ensure_indexes(&mongo_db).await?;

    Ok(Some(InfraClients { mongo_db }))
}

// The unique mynumber index is the store-level duplicate guard; the
// in-memory pre-check alone would leave a check-then-insert gap.
async fn ensure_indexes(db: &Database) -> Result<(), String> {
    let collection = db.collection::<mongodb::bson::Document>(RECORDS_COLLECTION);
    let unique = IndexOptions::builder().unique(true).build();

    let indexes = vec![
        IndexModel::builder()
            .keys(doc! { "mynumber": 1 })
            .options(unique)
            .build(),
        IndexModel::builder().keys(doc! { "created_at": -1 }).build(),
    ];

    collection
        .create_indexes(indexes)
        .await
        .map_err(|e| format!("mongodb index creation failed: {e}"))?;
    Ok(())
}
