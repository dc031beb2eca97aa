use crate::{db_types::MenuItem, traits::StorageError};

/// Resolves menu item names to their current price. Menus themselves are maintained outside the order engine.
#[allow(async_fn_in_trait)]
pub trait MenuLookup {
    /// Fetches the menu item with the given name, or `None` if there is no such item.
    async fn fetch_menu_item(&mut self, name: &str) -> Result<Option<MenuItem>, StorageError>;
}
