//! Cart commands: show, add, remove, update, clear.

use std::fmt::Write;

use rocketshoes_cart::UpdateProductAmount;
use rocketshoes_core::{Cart, ProductId};

use super::Session;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Print the cart.
pub fn show(session: &Session) {
    print_cart(&session.store.cart());
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the store rejected or failed the operation.
pub async fn add(session: &mut Session, id: ProductId) -> CommandResult {
    session.store.add_product(id).await;
    finish(session)
}

/// Remove a product.
///
/// # Errors
///
/// Returns an error if the product was not in the cart or storage failed.
pub async fn remove(session: &mut Session, id: ProductId) -> CommandResult {
    session.store.remove_product(id).await;
    finish(session)
}

/// Set the amount of a product.
///
/// # Errors
///
/// Returns an error if the store rejected or failed the operation.
pub async fn update(session: &mut Session, id: ProductId, amount: i64) -> CommandResult {
    session
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: id,
            amount,
        })
        .await;
    finish(session)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if storage failed.
pub async fn clear(session: &mut Session) -> CommandResult {
    session.store.clear().await;
    finish(session)
}

/// Print the cart, then fail if the operation produced any notice.
fn finish(session: &mut Session) -> CommandResult {
    print_cart(&session.store.cart());

    let notices = session.take_notices();
    match notices.as_slice() {
        [] => Ok(()),
        [notice] => Err(notice.to_string().into()),
        many => Err(many
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
            .into()),
    }
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    print!("{}", render_cart(cart));
}

/// Render the cart as a table with line totals and the cart total.
pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.\n".to_string();
    }

    let mut out = format!(
        "{:>4}  {:<40} {:>5} {:>14} {:>14}\n",
        "ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"
    );
    for item in cart {
        let _ = writeln!(
            out,
            "{:>4}  {:<40} {:>5} {:>14} {:>14}",
            item.id,
            truncate(&item.title, 40),
            item.amount,
            item.unit_price().display(),
            item.line_total().display(),
        );
    }

    let units = cart.item_count();
    let _ = writeln!(
        out,
        "\nTotal ({units} {}): {}",
        if units == 1 { "item" } else { "items" },
        cart.subtotal().display()
    );
    out
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}
