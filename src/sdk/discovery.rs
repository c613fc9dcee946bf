use std::path::Path;
use std::sync::Arc;

use crate::engine::{MemStore, Persistence};
use crate::{KeyEnumeration, Result};

/// Opens the store kept in `data_dir`.
///
/// Every `<key>.json` file in the directory is loaded into a [`MemStore`] and
/// further writes are persisted back to the same directory. The directory is
/// created if it does not exist.
///
/// # Examples
///
/// ```no_run
/// use motoshop_store::sdk::{self, Shop};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let store = sdk::open("./data").await?;
///     let shop = Shop::new(store.clone());
///     println!("{} customers", shop.customers().len().await?);
///     store.wait().await;
///     Ok(())
/// }
/// ```
pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Arc<MemStore>> {
    let persistence = Arc::new(Persistence::new(data_dir)?);
    let initial_data = persistence.load_all()?;
    let store = MemStore::new(initial_data, Some(persistence.clone()));
    log::info!(
        "Opened store at {:?} with keys {:?}",
        persistence.data_dir(),
        store.keys().await?
    );
    Ok(Arc::new(store))
}
