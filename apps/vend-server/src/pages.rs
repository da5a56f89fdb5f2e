//! # HTML Pages
//!
//! Server-rendered customer and admin pages.
//!
//! Every value that came from the database or a form goes through
//! [`escape`] before it is written into markup.

use vend_core::{Denomination, Money, Product, TransactionLogEntry};

use crate::session::Flash;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
table {{ border-collapse: collapse; margin-bottom: 1.5rem; }}
th, td {{ border: 1px solid #ccc; padding: 0.3rem 0.6rem; text-align: left; }}
.flash.success {{ color: #155724; background: #d4edda; padding: 0.5rem; }}
.flash.error {{ color: #721c24; background: #f8d7da; padding: 0.5rem; }}
.balance {{ font-size: 1.4rem; font-weight: bold; }}
#result {{ white-space: pre-line; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

fn product_table(out: &mut String, heading: &str, products: &[Product]) {
    out.push_str(&format!("<h2>{}</h2>\n", escape(heading)));
    out.push_str("<table>\n<tr><th>ID</th><th>Name</th><th>Price</th><th>Available</th></tr>\n");
    for product in products {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            product.id,
            escape(&product.name),
            product.price(),
            product.quantity
        ));
    }
    out.push_str("</table>\n");
}

fn money_buttons(out: &mut String, label: &str, denominations: impl Iterator<Item = Denomination>) {
    out.push_str(&format!("<p>{}:\n", escape(label)));
    for denomination in denominations {
        out.push_str(&format!(
            "<button type=\"button\" onclick=\"insertMoney('{}')\">{}</button>\n",
            denomination.value().decimal(),
            denomination
        ));
    }
    out.push_str("</p>\n");
}

/// The customer page: cake and drink sections plus the current balance.
pub fn render_index(cakes: &[Product], drinks: &[Product], balance: Money) -> String {
    let mut body = String::new();

    body.push_str("<h1>Vending Machine</h1>\n");
    body.push_str(&format!(
        "<p class=\"balance\">Balance: <span id=\"balance\">{}</span></p>\n",
        balance
    ));

    product_table(&mut body, "Cakes", cakes);
    product_table(&mut body, "Drinks", drinks);

    body.push_str("<h2>Insert Money</h2>\n");
    money_buttons(&mut body, "Notes", Denomination::notes());
    money_buttons(&mut body, "Coins", Denomination::coins());

    body.push_str(
        r#"<h2>Purchase</h2>
<form id="purchase" onsubmit="purchase(event)">
<label>Product ID <input type="number" name="product_id" min="1" required></label>
<label>Quantity <input type="number" name="quantity" min="1" value="1" required></label>
<button type="submit">Buy</button>
</form>
<p><button type="button" onclick="returnChange()">Return Change</button></p>
<p id="result"></p>
<p><a href="/admin">Admin</a></p>
<script>
function show(data) {
  const msg = data.success || data.error || data.info || data.message || "";
  const extra = data.change_breakdown ? "\n" + data.change_breakdown : "";
  document.getElementById("result").textContent = msg + extra;
  if (data.inserted_money !== undefined) {
    document.getElementById("balance").textContent = "Rs " + Number(data.inserted_money).toFixed(2);
  }
}
function post(url, body) {
  return fetch(url, { method: "POST", body: new URLSearchParams(body) })
    .then(r => r.json()).then(show);
}
function insertMoney(amount) { post("/insert_money", { amount }); }
function purchase(event) {
  event.preventDefault();
  post("/purchase", new FormData(event.target)).then(() => location.reload());
}
function returnChange() { post("/return_change", {}); }
</script>
"#,
    );

    layout("Vending Machine", &body)
}

/// The admin page: flash messages, inventory editor and transaction log.
pub fn render_admin(
    products: &[Product],
    transactions: &[TransactionLogEntry],
    flashes: &[Flash],
) -> String {
    let mut body = String::new();

    body.push_str("<h1>Admin</h1>\n<p><a href=\"/\">Back to machine</a></p>\n");

    for flash in flashes {
        body.push_str(&format!(
            "<p class=\"flash {}\">{}</p>\n",
            flash.level.css_class(),
            escape(&flash.message)
        ));
    }

    body.push_str("<h2>Products</h2>\n<table>\n<tr><th>ID</th><th>Name</th><th>Type</th><th>Price (Rs)</th><th>Quantity</th><th></th><th></th></tr>\n");
    for product in products {
        let form_id = format!("update-{}", product.id);
        body.push_str(&format!(
            concat!(
                r#"<tr><td>{id}<form id="{form}" method="post" action="/admin/update_product">"#,
                r#"<input type="hidden" name="product_id" value="{id}"></form></td>"#,
                r#"<td><input form="{form}" name="name" value="{name}"></td>"#,
                r#"<td><input form="{form}" name="type" value="{category}"></td>"#,
                r#"<td><input form="{form}" name="price" value="{price}"></td>"#,
                r#"<td><input form="{form}" name="quantity" type="number" min="0" value="{quantity}"></td>"#,
                r#"<td><button form="{form}" type="submit">Update</button></td>"#,
                r#"<td><a href="/admin/delete_product/{id}">Delete</a></td></tr>"#,
                "\n"
            ),
            id = product.id,
            form = form_id,
            name = escape(&product.name),
            category = escape(&product.category),
            price = product.price().decimal(),
            quantity = product.quantity
        ));
    }
    body.push_str("</table>\n");

    body.push_str(
        r#"<h2>Add Product</h2>
<form method="post" action="/admin/add_product">
<label>Name <input name="new_name" required></label>
<label>Type <input name="new_type" required></label>
<label>Price (Rs) <input name="new_price" required></label>
<label>Quantity <input name="new_quantity" type="number" min="0" required></label>
<button type="submit">Add</button>
</form>
"#,
    );

    body.push_str("<h2>Recent Transactions</h2>\n");
    if transactions.is_empty() {
        body.push_str("<p>No transactions yet.</p>\n");
    } else {
        body.push_str(concat!(
            "<table>\n<tr><th>Date</th><th>Time</th><th>Inserted Notes</th>",
            "<th>Inserted Coins</th><th>Change Notes</th><th>Change Coins</th>",
            "<th>Total Inserted</th><th>Change</th><th>Products</th></tr>\n"
        ));
        for entry in transactions {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&entry.date),
                escape(&entry.time),
                entry.inserted_notes,
                entry.inserted_coins,
                entry.change_notes,
                entry.change_coins,
                entry.total_inserted,
                entry.change_amount,
                escape(&entry.products_purchased)
            ));
        }
        body.push_str("</table>\n");
    }

    layout("Vending Machine Admin", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FlashLevel;
    use vend_core::CATEGORY_CAKE;

    fn mm() -> Product {
        Product {
            id: 3,
            name: "m&m".to_string(),
            category: CATEGORY_CAKE.to_string(),
            price_cents: 3000,
            quantity: 5,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_index_lists_products_and_balance() {
        let html = render_index(&[mm()], &[], Money::from_cents(5550));

        assert!(html.contains("m&amp;m"));
        assert!(html.contains("Rs 30.00"));
        assert!(html.contains("Balance: <span id=\"balance\">Rs 55.50</span>"));
        assert!(html.contains("insertMoney('0.05')"));
        assert!(html.contains("<p>Notes:"));
        let last_note = html.find("insertMoney('1.00')").unwrap();
        let coins = html.find("<p>Coins:").unwrap();
        assert!(last_note < coins);
    }

    #[test]
    fn test_admin_shows_flashes_escaped() {
        let flashes = vec![Flash {
            level: FlashLevel::Error,
            message: "<script>".to_string(),
        }];
        let html = render_admin(&[mm()], &[], &flashes);

        assert!(html.contains(r#"<p class="flash error">&lt;script&gt;</p>"#));
        assert!(html.contains("/admin/delete_product/3"));
        assert!(html.contains("No transactions yet."));
    }
}
