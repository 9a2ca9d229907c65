//! HTML rendering for the expense page.
//!
//! The page has three parts: the entry form, account balances, and the most
//! recent transactions. Every piece of text coming from configuration or the
//! budgeting service is escaped.

use std::fmt::{self, Write};

use chrono::NaiveDate;

use crate::models::{currency::Ledger, snapshot::Snapshot, transaction::Transaction};

/// Most transactions shown in the history, newest first.
pub const MAX_VISIBLE_TRANSACTIONS: usize = 100;

/// Everything needed to render the index page.
pub struct IndexPage<'a> {
    pub title: &'a str,
    pub snapshot: &'a Snapshot,
    pub ledger: &'a Ledger,
    pub hide_balance: &'a [String],
    pub today: NaiveDate,
    /// Fixture name to carry through the forms, blank for the live budget.
    pub mock: &'a str,
}

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// `path`, carrying the fixture selection as a `mock` query parameter.
pub fn with_mock(path: &str, mock: &str) -> String {
    if mock.is_empty() {
        path.to_string()
    } else {
        let encoded: String = url::form_urlencoded::byte_serialize(mock.as_bytes()).collect();
        format!("{path}?mock={encoded}")
    }
}

pub fn render_index(page: &IndexPage<'_>) -> Result<String, fmt::Error> {
    let mut content = String::new();
    write_form(&mut content, page)?;
    write_balances(&mut content, page)?;
    write_history(&mut content, page)?;
    layout(page.title, &content)
}

fn layout(title: &str, content: &str) -> Result<String, fmt::Error> {
    let title = escape(title);
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    )?;
    writeln!(out, "<title>{title}</title>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>{title}</h1>")?;
    out.push_str(content);
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

fn write_form(out: &mut String, page: &IndexPage<'_>) -> fmt::Result {
    let mock = escape(page.mock);
    writeln!(out, "<form method=\"post\" action=\"/enter\" class=\"entry\">")?;
    writeln!(out, "<input type=\"hidden\" name=\"mock\" value=\"{mock}\">")?;
    writeln!(
        out,
        "<label>Date <input type=\"date\" name=\"date\" value=\"{}\"></label>",
        page.today.format("%Y-%m-%d")
    )?;

    writeln!(out, "<label>Account <select name=\"account\">")?;
    for account in &page.snapshot.accounts {
        writeln!(
            out,
            "<option value=\"{}\">{}</option>",
            escape(&account.id),
            escape(&account.name)
        )?;
    }
    writeln!(out, "</select></label>")?;

    writeln!(out, "<label>Category <select name=\"category\">")?;
    for category in &page.snapshot.all_categories {
        writeln!(
            out,
            "<option value=\"{}\">{}</option>",
            escape(category.id()),
            escape(category.name())
        )?;
    }
    writeln!(out, "</select></label>")?;

    writeln!(
        out,
        "<label>Amount <input type=\"text\" name=\"amount\" inputmode=\"decimal\" required></label>"
    )?;
    writeln!(out, "<select name=\"currency\">")?;
    let default_code = &page.ledger.default_currency().code;
    for currency in page.ledger.currencies() {
        let selected = if &currency.code == default_code {
            " selected"
        } else {
            ""
        };
        writeln!(
            out,
            "<option value=\"{code}\"{selected}>{code}</option>",
            code = escape(&currency.code)
        )?;
    }
    writeln!(out, "</select>")?;

    writeln!(
        out,
        "<label>Comment <input type=\"text\" name=\"comment\"></label>"
    )?;
    writeln!(out, "<button type=\"submit\">Save</button>")?;
    writeln!(out, "</form>")?;

    writeln!(
        out,
        "<form method=\"post\" action=\"{}\" class=\"refresh\">\
         <button type=\"submit\">Refresh</button></form>",
        escape(&with_mock("/refresh", page.mock))
    )
}

fn write_balances(out: &mut String, page: &IndexPage<'_>) -> fmt::Result {
    let budget = page.ledger.budget();
    writeln!(out, "<table class=\"balances\">")?;
    for account in page
        .snapshot
        .accounts
        .iter()
        .filter(|a| !page.hide_balance.contains(&a.name))
    {
        write!(
            out,
            "<tr><th>{}</th><td>{}</td>",
            escape(&account.name),
            escape(&budget.format(account.balance, false))
        )?;
        if let Some(secondary) = page.ledger.secondary() {
            let converted = page
                .ledger
                .convert_monetary(account.balance, budget, secondary);
            write!(out, "<td>{}</td>", escape(&converted.format(false)))?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")
}

fn write_history(out: &mut String, page: &IndexPage<'_>) -> fmt::Result {
    let budget = page.ledger.budget();
    writeln!(out, "<table class=\"history\">")?;
    for tx in page
        .snapshot
        .transactions
        .iter()
        .rev()
        .take(MAX_VISIBLE_TRANSACTIONS)
    {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            tx.date.format("%Y-%m-%d"),
            escape(account_name(page.snapshot, &tx.account_id)),
            escape(&category_label(page.snapshot, tx)),
            escape(&tx.comment),
            escape(&budget.format(tx.amount, false))
        )?;
    }
    writeln!(out, "</table>")
}

fn account_name<'a>(snapshot: &'a Snapshot, id: &'a str) -> &'a str {
    snapshot.account(id).map(|a| a.name.as_str()).unwrap_or(id)
}

fn category_label(snapshot: &Snapshot, tx: &Transaction) -> String {
    match &tx.transfer_account_id {
        Some(target) => format!("Transfer to {}", account_name(snapshot, target)),
        None => snapshot
            .category(&tx.category_id)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| tx.category_id.clone()),
    }
}
