//! Catalog listing.

use std::fmt::Write;

use rocketshoes_core::{Cart, Product};

use super::Session;

/// List the catalog along with how many of each product are in the cart.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn list(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let products = session.store.catalog().list_products().await?;
    print_products(&products, &session.store.cart());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product], cart: &Cart) {
    print!("{}", render_products(products, cart));
}

/// Render the catalog as a table with an "in cart" column.
pub fn render_products(products: &[Product], cart: &Cart) -> String {
    if products.is_empty() {
        return "No products available.\n".to_string();
    }

    let amounts = cart.amounts();
    let mut out = format!("{:>4}  {:<60} {:>14} {:>8}\n", "ID", "PRODUCT", "PRICE", "IN CART");
    for product in products {
        let in_cart = amounts.get(&product.id).copied().unwrap_or(0);
        let _ = writeln!(
            out,
            "{:>4}  {:<60} {:>14} {:>8}",
            product.id,
            product.title,
            product.unit_price().display(),
            in_cart
        );
    }
    out
}
