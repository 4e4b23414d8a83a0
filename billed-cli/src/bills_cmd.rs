//! `billed bills ...`: drives the page controllers against a headless document.

use anyhow::{bail, Context, Result};
use billed_core::{BillRecord, DisplayBill, KeyValueStorage, Route};
use billed_front::{fire_event, views, Bills, Document, NewBill};
use billed_store::{Attachment, Store};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// Field values for `billed bills submit`
#[derive(Debug, Clone, Default)]
pub struct SubmitArgs {
    pub file: Option<PathBuf>,
    pub expense_type: Option<String>,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

/// Bills newest first, formatted the way the Bills page shows them.
pub async fn list_bills(
    store: Arc<dyn Store>,
    storage: Arc<dyn KeyValueStorage>,
) -> Result<Vec<DisplayBill>> {
    let page = Bills::new(Document::new(), |_| {}, Some(store), storage);
    let mut bills = page
        .get_bills()
        .await
        .context("fetching bills")?
        .unwrap_or_default();

    // Same ordering as the Bills table.
    bills.sort_by(|a, b| b.raw_date.cmp(&a.raw_date));
    Ok(bills)
}

pub fn render_table(bills: &[DisplayBill]) -> String {
    let mut out = format!(
        "{:<22} {:<12} {:<22} {:>10}  {}\n",
        "ID", "DATE", "NAME", "AMOUNT", "STATUS"
    );
    for b in bills {
        out.push_str(&format!(
            "{:<22} {:<12} {:<22} {:>10}  {}\n",
            b.id,
            b.date,
            b.name.as_deref().unwrap_or("-"),
            format!("{} €", b.amount),
            b.status
        ));
    }
    out
}

pub async fn show_bill(
    store: Arc<dyn Store>,
    storage: Arc<dyn KeyValueStorage>,
    id: &str,
) -> Result<BillRecord> {
    let page = NewBill::new(Document::new(), |_| {}, Some(store), storage);
    page.fetch_bill(id)
        .await
        .with_context(|| format!("fetching bill {id}"))
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("proof file has no name")?;
    Ok(Attachment::new(name, content_type(path), bytes))
}

/// Fill and submit the NewBill form. Fails when the form stays on screen.
pub async fn submit_bill(
    store: Arc<dyn Store>,
    storage: Arc<dyn KeyValueStorage>,
    args: &SubmitArgs,
) -> Result<()> {
    let doc = Document::new();
    doc.set_body(views::new_bill_ui());

    let navigated = Rc::new(Cell::new(None));
    let nav = navigated.clone();
    let page = NewBill::new(doc.clone(), move |route| nav.set(Some(route)), Some(store), storage);

    let field = |test_id: &str| {
        doc.by_test_id(test_id)
            .with_context(|| format!("form field {test_id} missing"))
    };
    if let Some(t) = &args.expense_type {
        fire_event::type_value(&field("expense-type")?, t);
    }
    fire_event::type_value(&field("expense-name")?, &args.name);
    fire_event::type_value(&field("datepicker")?, &args.date);
    fire_event::type_value(&field("amount")?, &args.amount);
    fire_event::type_value(&field("vat")?, &args.vat);
    fire_event::type_value(&field("pct")?, &args.pct);
    fire_event::type_value(&field("commentary")?, &args.commentary);

    if let Some(path) = &args.file {
        let attachment = read_attachment(path)?;
        let _ = fire_event::change_files(&field("file")?, vec![attachment]);
        if page.file_name().is_none() {
            bail!("{}: Mauvais format (jpg, jpeg or png expected)", path.display());
        }
    }

    fire_event::submit(&field("form-new-bill")?).settle().await;

    match navigated.get() {
        Some(Route::Bills) => Ok(()),
        _ => bail!("bill was not saved (see log for the store error)"),
    }
}
