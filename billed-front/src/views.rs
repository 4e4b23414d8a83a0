//! Page markup for the employee screens, built as element trees.

use billed_core::{DisplayBill, Route, EXPENSE_TYPES};

use crate::dom::Element;

pub const MODAL_ID: &str = "modaleFile";

/// Left-hand navigation with the icon of `active` highlighted.
pub fn vertical_layout(active: Route) -> Element {
    let icon = |test_id: &str, route: Route| {
        let id = format!("layout-{}", test_id.trim_start_matches("icon-"));
        let el = Element::new("div").with_id(&id).with_test_id(test_id);
        if route == active {
            el.add_class("active-icon");
        }
        el
    };
    Element::new("div")
        .with_class("vertical-navbar")
        .with_child(Element::new("div").with_class("layout-title").with_text("Billed"))
        .with_child(icon("icon-window", Route::Bills))
        .with_child(icon("icon-mail", Route::NewBill))
}

fn row(bill: &DisplayBill) -> Element {
    let cell = |text: &str| Element::new("td").with_text(text);
    let eye = Element::new("div")
        .with_id("eye")
        .with_test_id("icon-eye")
        .with_class("icon-eye")
        .with_attr("data-bill-url", bill.file_url.as_deref().unwrap_or(""));

    Element::new("tr")
        .with_child(cell(bill.bill_type.as_deref().unwrap_or("")))
        .with_child(cell(bill.name.as_deref().unwrap_or("")))
        .with_child(cell(&bill.date))
        .with_child(cell(&format!("{} €", bill.amount)))
        .with_child(cell(&bill.status))
        .with_child(
            Element::new("td")
                .with_child(Element::new("div").with_class("icon-actions").with_child(eye)),
        )
}

/// Image preview modal, hidden until an eye icon is clicked.
pub fn modal() -> Element {
    Element::new("div")
        .with_id(MODAL_ID)
        .with_class("modal fade")
        .with_child(
            Element::new("div")
                .with_class("modal-dialog modal-dialog-centered modal-lg")
                .with_child(Element::new("div").with_class("modal-content").with_children([
                    Element::new("div").with_class("modal-header").with_child(
                        Element::new("h5")
                            .with_class("modal-title")
                            .with_text("Justificatif"),
                    ),
                    Element::new("div").with_class("modal-body"),
                ])),
        )
}

/// Bills page; rows are ordered newest first on the stored dates.
pub fn bills_ui(bills: &[DisplayBill]) -> Vec<Element> {
    let mut sorted: Vec<&DisplayBill> = bills.iter().collect();
    sorted.sort_by(|a, b| b.raw_date.cmp(&a.raw_date));

    let header = ["Type", "Nom", "Date", "Montant", "Statut", "Actions"]
        .into_iter()
        .map(|h| Element::new("th").with_text(h));

    let content = Element::new("div")
        .with_class("content")
        .with_child(
            Element::new("div")
                .with_class("content-header")
                .with_child(
                    Element::new("div")
                        .with_class("content-title")
                        .with_text("Mes notes de frais"),
                )
                .with_child(
                    Element::new("button")
                        .with_test_id("btn-new-bill")
                        .with_class("btn btn-primary")
                        .with_attr("type", "button")
                        .with_text("Nouvelle note de frais"),
                ),
        )
        .with_child(
            Element::new("div").with_id("data-table").with_child(
                Element::new("table")
                    .with_id("example")
                    .with_class("table table-striped")
                    .with_child(
                        Element::new("thead").with_child(Element::new("tr").with_children(header)),
                    )
                    .with_child(
                        Element::new("tbody")
                            .with_test_id("tbody")
                            .with_children(sorted.into_iter().map(row)),
                    ),
            ),
        );

    vec![
        Element::new("div")
            .with_class("layout")
            .with_child(vertical_layout(Route::Bills))
            .with_child(content),
        modal(),
    ]
}

pub fn error_page(message: &str) -> Vec<Element> {
    vec![Element::new("div")
        .with_class("layout")
        .with_child(vertical_layout(Route::Bills))
        .with_child(
            Element::new("div")
                .with_class("content")
                .with_child(
                    Element::new("div")
                        .with_class("content-header")
                        .with_text("Erreur"),
                )
                .with_child(
                    Element::new("div")
                        .with_test_id("error-message")
                        .with_text(message),
                ),
        )]
}

fn field(label: &str, input: Element) -> Element {
    Element::new("div")
        .with_class("col-half")
        .with_child(Element::new("label").with_class("bold-label").with_text(label))
        .with_child(input)
}

pub fn new_bill_ui() -> Vec<Element> {
    let expense_type = Element::new("select")
        .with_test_id("expense-type")
        .with_class("form-control blue-border")
        .with_value(EXPENSE_TYPES[0])
        .with_children(
            EXPENSE_TYPES
                .into_iter()
                .map(|t| Element::new("option").with_text(t)),
        );

    let input = |kind: &str, test_id: &str| {
        Element::new("input")
            .with_attr("type", kind)
            .with_test_id(test_id)
            .with_class("form-control blue-border")
    };

    let commentary = Element::new("textarea")
        .with_test_id("commentary")
        .with_class("form-control blue-border");

    let form = Element::new("form")
        .with_test_id("form-new-bill")
        .with_children([
            field("Type de dépense", expense_type),
            field(
                "Nom de la dépense",
                input("text", "expense-name").with_attr("placeholder", "Vol Paris Londres"),
            ),
            field("Date", input("date", "datepicker")),
            field(
                "Montant TTC",
                input("number", "amount").with_attr("placeholder", "348"),
            ),
            field("TVA", input("number", "vat").with_attr("placeholder", "70")),
            field("%", input("number", "pct").with_attr("placeholder", "20")),
            field("Commentaire", commentary),
            field("Justificatif", input("file", "file")),
            Element::new("button")
                .with_id("btn-send-bill")
                .with_attr("type", "submit")
                .with_class("btn btn-primary")
                .with_text("Envoyer"),
        ]);

    vec![Element::new("div")
        .with_class("layout")
        .with_child(vertical_layout(Route::NewBill))
        .with_child(
            Element::new("div")
                .with_class("content")
                .with_child(
                    Element::new("div")
                        .with_class("content-header")
                        .with_text("Envoyer une note de frais"),
                )
                .with_child(
                    Element::new("div")
                        .with_class("form-newbill-container content-inner")
                        .with_child(form),
                ),
        )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use billed_store::fixtures;

    fn raw_rows() -> Vec<DisplayBill> {
        fixtures::bills().iter().map(DisplayBill::unformatted).collect()
    }

    fn is_iso_date(s: &str) -> bool {
        let b = s.as_bytes();
        s.len() == 10
            && b[4] == b'-'
            && b[7] == b'-'
            && s.chars().enumerate().all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
    }

    #[test]
    fn test_bills_are_ordered_antichronologically() {
        let doc = Document::new();
        doc.set_body(bills_ui(&raw_rows()));

        let dates: Vec<String> = doc
            .all_by_text(is_iso_date)
            .iter()
            .map(|e| e.inner_html())
            .collect();
        assert_eq!(dates.len(), 4);
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_bill_icon_highlighted_on_bills_page() {
        let doc = Document::new();
        doc.set_body(bills_ui(&[]));
        assert!(doc.by_test_id("icon-window").unwrap().has_class("active-icon"));
        assert!(!doc.by_test_id("icon-mail").unwrap().has_class("active-icon"));
    }

    #[test]
    fn test_rows_carry_bill_urls() {
        let doc = Document::new();
        doc.set_body(bills_ui(&raw_rows()));
        let eyes = doc.all_by_test_id("icon-eye");
        assert_eq!(eyes.len(), 4);
        assert!(eyes.iter().all(|e| {
            e.attr("data-bill-url")
                .is_some_and(|u| u.starts_with("https://"))
        }));
        assert!(doc.body().inner_html().contains("400 €"));
    }

    #[test]
    fn test_error_page_shows_message() {
        let doc = Document::new();
        doc.set_body(error_page("Erreur 404"));
        assert_eq!(doc.by_test_id("error-message").unwrap().text(), "Erreur 404");
    }

    #[test]
    fn test_new_bill_form_markers() {
        let doc = Document::new();
        doc.set_body(new_bill_ui());
        let form = doc.by_test_id("form-new-bill").unwrap();
        let ids = [
            "expense-type",
            "expense-name",
            "datepicker",
            "amount",
            "vat",
            "pct",
            "commentary",
            "file",
        ];
        for id in ids {
            assert!(form.find_by_test_id(id).is_some(), "missing {id}");
        }
        assert_eq!(doc.by_test_id("expense-type").unwrap().value(), "Transports");
        assert!(doc.by_test_id("icon-mail").unwrap().has_class("active-icon"));
    }
}
