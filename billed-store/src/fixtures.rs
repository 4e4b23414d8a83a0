//! Sample bills shared by the mock store, the views and the tests.

use billed_core::{BillRecord, BillStatus};

const FILE_URL: &str = "https://test.storage.tld/v0/b/billable-677b6.a…f-1.jpg?alt=media&token=c1640e12-a24b-4b11-ae52-529112e9602a";

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    date: &str,
    amount: f64,
    status: BillStatus,
    bill_type: &str,
    name: &str,
    vat: &str,
    commentary: &str,
    comment_admin: &str,
    file_name: &str,
) -> BillRecord {
    BillRecord {
        file_url: Some(FILE_URL.to_string()),
        file_name: Some(file_name.to_string()),
        bill_type: Some(bill_type.to_string()),
        name: Some(name.to_string()),
        vat: Some(vat.to_string()),
        pct: Some(20),
        commentary: Some(commentary.to_string()),
        comment_admin: Some(comment_admin.to_string()),
        ..BillRecord::new(id, date, amount, status, "a@a")
    }
}

fn hotel() -> BillRecord {
    record(
        "47qAXb6fIm2zOKkLzMro",
        "2004-04-04",
        400.0,
        BillStatus::Pending,
        "Hôtel et logement",
        "encore",
        "80",
        "séminaire billed",
        "ok",
        "preview-facture-free-201801-pdf-1.jpg",
    )
}

fn transport() -> BillRecord {
    record(
        "BeKy5Mo4jkmdfPGYpTxZ",
        "2001-01-01",
        100.0,
        BillStatus::Refused,
        "Transports",
        "test1",
        "",
        "plop",
        "en fait non",
        "1592770761.jpeg",
    )
}

fn online() -> BillRecord {
    record(
        "UIUZtnPQvnbFnB0ozvJh",
        "2003-03-03",
        300.0,
        BillStatus::Accepted,
        "Services en ligne",
        "test3",
        "60",
        "",
        "bon bah d'accord",
        "facture-client-php-exportee-dans-document-pdf-enregistre-sur-disque-dur.png",
    )
}

fn restaurant() -> BillRecord {
    record(
        "qcCK3SzECmaZAGRrHjaC",
        "2002-02-02",
        200.0,
        BillStatus::Refused,
        "Restaurants et bars",
        "test2",
        "40",
        "test2",
        "pas la bonne facture",
        "preview-facture-free-201801-pdf-1.jpg",
    )
}

/// The four sample bills in insertion order (not sorted by date).
pub fn bills() -> Vec<BillRecord> {
    vec![hotel(), transport(), online(), restaurant()]
}

/// The same four bills as the remote store hands them out, newest first.
pub fn store_bills() -> Vec<BillRecord> {
    vec![hotel(), online(), restaurant(), transport()]
}
