//! # PDF Invoice
//!
//! Lays an [`Invoice`] out on A4 pages with the built-in Helvetica faces.
//! All strings come from the invoice as built by `checkout-core`, so the
//! totals printed here are the ones on the text receipt. Pages are planned
//! as lists of drawing operations first, then painted with printpdf.
//!
//! ## Page Layout (mm, from the top-left corner)
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              SUPERMART INVOICE               │ bold 16
//! │                                              │
//! │ Transaction ID: TXN-...                      │ regular 12, 8 mm lines
//! │ Date / Customer / UTR                        │
//! │                                              │
//! │ ┌────────────────┬──────┬────────┬────────┐  │ 80 / 30 / 40 / 40
//! │ │ Product Name   │ Qty  │ Price  │ Total  │  │ bold 10, 8 mm rows
//! │ ├────────────────┼──────┼────────┼────────┤  │
//! │ │ Milk (Amul)    │    2 │  49.00 │  98.00 │  │ page break repeats
//! │ └────────────────┴──────┴────────┴────────┘  │ the header row
//! │                                              │
//! │                       Subtotal: │Rs. 218.00│ │ bold 12
//! │                      Tax (18%): │ Rs. 39.24│ │
//! │                          TOTAL: │Rs. 257.24│ │
//! │                                              │
//! │      Thank you for shopping with SuperMart!  │ italic 10
//! └──────────────────────────────────────────────┘
//! ```

use checkout_core::Invoice;

use crate::error::RenderResult;

/// True if this build can produce PDF invoices.
pub fn pdf_available() -> bool {
    cfg!(feature = "pdf")
}

/// Renders `invoice` as PDF bytes.
///
/// Either the whole document is returned or an error is; there are no
/// partial outputs.
///
/// ## Errors
/// * `Pdf` - the PDF library failed
/// * `CapabilityUnavailable("pdf")` - built without the feature
#[cfg(feature = "pdf")]
pub fn render_pdf(invoice: &Invoice) -> RenderResult<Vec<u8>> {
    let rendered = layout::render(invoice)?;
    tracing::debug!(
        trans_id = %invoice.trans_id,
        pages = rendered.pages,
        bytes = rendered.bytes.len(),
        "Rendered PDF invoice"
    );
    Ok(rendered.bytes)
}

#[cfg(not(feature = "pdf"))]
pub fn render_pdf(_invoice: &Invoice) -> RenderResult<Vec<u8>> {
    Err(crate::error::RenderError::CapabilityUnavailable(
        "pdf".to_string(),
    ))
}

#[cfg(feature = "pdf")]
mod layout {
    use checkout_core::Invoice;
    use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, Point};

    use crate::error::{RenderError, RenderResult};

    const PAGE_WIDTH: f32 = 210.0;
    const PAGE_HEIGHT: f32 = 297.0;
    const MARGIN: f32 = 10.0;
    const ROW_HEIGHT: f32 = 8.0;
    const CELL_PADDING: f32 = 2.0;
    const GAP: f32 = 10.0;
    const COLUMNS: [f32; 4] = [80.0, 30.0, 40.0, 40.0];
    const SUMMARY_LABEL_WIDTH: f32 = 150.0;
    const SUMMARY_AMOUNT_WIDTH: f32 = 40.0;
    const PT_TO_MM: f32 = 0.3528;

    pub(super) struct Rendered {
        pub bytes: Vec<u8>,
        pub pages: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Face {
        Regular,
        Bold,
        Italic,
    }

    #[derive(Clone, Copy)]
    enum Align {
        Left,
        Right,
    }

    /// One drawing operation, in PDF coordinates (mm from the bottom left).
    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Text {
            text: String,
            size: f32,
            face: Face,
            x: f32,
            y: f32,
        },
        Rect {
            x: f32,
            top: f32,
            width: f32,
            height: f32,
        },
    }

    /// Approximate Helvetica advance width in mm.
    fn text_width(text: &str, size: f32) -> f32 {
        let em: f32 = text
            .chars()
            .map(|c| match c {
                '0'..='9' => 0.556,
                '.' | ',' | ' ' | ':' | '|' | '\'' | 'i' | 'l' | 'j' => 0.278,
                'm' | 'w' => 0.833,
                'M' | 'W' => 0.9,
                'A'..='Z' => 0.68,
                'a'..='z' => 0.52,
                _ => 0.556,
            })
            .sum();
        em * size * PT_TO_MM
    }

    /// Cuts `text` until it fits in `width` mm.
    fn fit(text: &str, size: f32, width: f32) -> String {
        let mut out: String = text.to_string();
        while !out.is_empty() && text_width(&out, size) > width {
            out.pop();
        }
        out
    }

    /// Page-by-page drawing plan.
    struct Layout {
        pages: Vec<Vec<Op>>,
        current: Vec<Op>,
        /// Distance of the next row from the top edge.
        y: f32,
    }

    impl Layout {
        fn new() -> Self {
            Layout {
                pages: Vec::new(),
                current: Vec::new(),
                y: MARGIN,
            }
        }

        fn new_page(&mut self) {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = MARGIN;
        }

        /// Starts a new page if `height` does not fit. Returns true if it did.
        fn ensure_room(&mut self, height: f32) -> bool {
            if self.y + height > PAGE_HEIGHT - MARGIN {
                self.new_page();
                true
            } else {
                false
            }
        }

        /// Writes `text` vertically centred in a cell of `height` at the current row.
        fn text_at(&mut self, text: &str, size: f32, face: Face, x: f32, height: f32) {
            let cap = size * PT_TO_MM * 0.7;
            let baseline = self.y + (height + cap) / 2.0;
            self.current.push(Op::Text {
                text: text.to_string(),
                size,
                face,
                x,
                y: PAGE_HEIGHT - baseline,
            });
        }

        fn cell(&mut self, text: &str, size: f32, face: Face, x: f32, width: f32, align: Align, border: bool) {
            let inner = width - 2.0 * CELL_PADDING;
            let text = fit(text, size, inner);
            let text_x = match align {
                Align::Left => x + CELL_PADDING,
                Align::Right => x + width - CELL_PADDING - text_width(&text, size),
            };
            self.text_at(&text, size, face, text_x, ROW_HEIGHT);
            if border {
                self.current.push(Op::Rect {
                    x,
                    top: PAGE_HEIGHT - self.y,
                    width,
                    height: ROW_HEIGHT,
                });
            }
        }

        fn centered(&mut self, text: &str, size: f32, face: Face, height: f32) {
            let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
            self.text_at(text, size, face, x.max(MARGIN), height);
        }

        fn advance(&mut self, height: f32) {
            self.y += height;
        }

        fn table_row(&mut self, cells: [&str; 4], face: Face) {
            let mut x = MARGIN;
            for (index, (text, width)) in cells.iter().zip(COLUMNS).enumerate() {
                let align = if index == 0 { Align::Left } else { Align::Right };
                self.cell(text, 10.0, face, x, width, align, true);
                x += width;
            }
            self.advance(ROW_HEIGHT);
        }

        fn table_header(&mut self) {
            self.table_row(["Product Name", "Qty", "Unit Price", "Total"], Face::Bold);
        }

        fn finish(mut self) -> Vec<Vec<Op>> {
            self.pages.push(self.current);
            self.pages
        }
    }

    /// Plans every page of `invoice`.
    fn plan(invoice: &Invoice) -> Vec<Vec<Op>> {
        let mut page = Layout::new();

        page.centered(&invoice.title, 16.0, Face::Bold, GAP);
        page.advance(GAP + GAP);

        for line in [
            format!("Transaction ID: {}", invoice.trans_id),
            format!("Date: {}", invoice.date),
            format!("Customer: {}", invoice.customer),
            format!("UTR: {}", invoice.utr),
        ] {
            page.text_at(&line, 12.0, Face::Regular, MARGIN, ROW_HEIGHT);
            page.advance(ROW_HEIGHT);
        }
        page.advance(GAP);

        page.ensure_room(2.0 * ROW_HEIGHT);
        page.table_header();
        for row in &invoice.rows {
            if page.ensure_room(ROW_HEIGHT) {
                page.table_header();
            }
            let qty = row.qty.to_string();
            page.table_row(
                [&row.name, &qty, &row.unit_price, &row.line_total],
                Face::Regular,
            );
        }
        page.advance(GAP);

        for summary in &invoice.summary {
            page.ensure_room(ROW_HEIGHT);
            let label = format!("{}:", summary.label);
            page.cell(&label, 12.0, Face::Bold, MARGIN, SUMMARY_LABEL_WIDTH, Align::Right, false);
            page.cell(
                &summary.amount,
                12.0,
                Face::Bold,
                MARGIN + SUMMARY_LABEL_WIDTH,
                SUMMARY_AMOUNT_WIDTH,
                Align::Right,
                true,
            );
            page.advance(ROW_HEIGHT);
        }
        page.advance(GAP);

        page.ensure_room(GAP);
        page.centered(&invoice.document_footer(), 10.0, Face::Italic, GAP);

        page.finish()
    }

    struct Fonts {
        regular: IndirectFontRef,
        bold: IndirectFontRef,
        italic: IndirectFontRef,
    }

    impl Fonts {
        fn get(&self, face: Face) -> &IndirectFontRef {
            match face {
                Face::Regular => &self.regular,
                Face::Bold => &self.bold,
                Face::Italic => &self.italic,
            }
        }
    }

    /// Draws the planned pages with the built-in Helvetica faces.
    fn paint(title: &str, pages: &[Vec<Op>]) -> RenderResult<Vec<u8>> {
        let (doc, first_page, first_layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let font = |face| {
            doc.add_builtin_font(face)
                .map_err(|e| RenderError::Pdf(e.to_string()))
        };
        let fonts = Fonts {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        };

        for (index, ops) in pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(
                    Mm(PAGE_WIDTH),
                    Mm(PAGE_HEIGHT),
                    format!("Page {}", index + 1),
                );
                doc.get_page(page).get_layer(layer)
            };

            for op in ops {
                match op {
                    Op::Text {
                        text,
                        size,
                        face,
                        x,
                        y,
                    } => layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), fonts.get(*face)),
                    Op::Rect {
                        x,
                        top,
                        width,
                        height,
                    } => layer.add_line(Line {
                        points: vec![
                            (Point::new(Mm(*x), Mm(*top)), false),
                            (Point::new(Mm(*x + *width), Mm(*top)), false),
                            (Point::new(Mm(*x + *width), Mm(*top - *height)), false),
                            (Point::new(Mm(*x), Mm(*top - *height)), false),
                        ],
                        is_closed: true,
                    }),
                }
            }
        }

        doc.save_to_bytes()
            .map_err(|e| RenderError::Pdf(e.to_string()))
    }

    pub(super) fn render(invoice: &Invoice) -> RenderResult<Rendered> {
        let pages = plan(invoice);
        let bytes = paint(&invoice.title, &pages)?;
        Ok(Rendered {
            bytes,
            pages: pages.len(),
        })
    }

    // =========================================================================
    // Unit Tests
    // =========================================================================

    #[cfg(test)]
    mod tests {
        use super::*;
        use checkout_core::{
            Money, ReceiptLine, TaxRate, Transaction, TransactionRecord, TransactionStatus,
        };
        use chrono::NaiveDate;

        fn invoice(items: usize) -> Invoice {
            let timestamp = NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(14, 3, 22))
                .unwrap();
            let items: Vec<ReceiptLine> = (0..items)
                .map(|i| ReceiptLine {
                    product_id: i as i64 + 1,
                    product_name: format!("Item number {i} with a rather long catalog name"),
                    brand: "Amul".to_string(),
                    qty: 1,
                    unit_price: Money::from_paise(4900),
                    line_total: Money::from_paise(4900),
                })
                .collect();
            let rate = TaxRate::from_bps(1800);
            let subtotal = Money::from_paise(4900 * items.len() as i64);
            let tax = subtotal.calculate_tax(rate);
            let record = TransactionRecord {
                transaction: Transaction {
                    trans_id: "TXN-20240501140322-9f86d081".to_string(),
                    timestamp,
                    customer_name: "Anonymous".to_string(),
                    subtotal,
                    tax_amount: tax,
                    tax_rate: rate,
                    total: subtotal + tax,
                    utr: "412345678901".to_string(),
                    exit_code: "EXIT-20240501140322".to_string(),
                    status: TransactionStatus::Completed,
                },
                items,
            };
            Invoice::build(&record, "SuperMart", "Rs.")
        }

        fn texts(pages: &[Vec<Op>]) -> Vec<&str> {
            pages
                .iter()
                .flatten()
                .filter_map(|op| match op {
                    Op::Text { text, .. } => Some(text.as_str()),
                    Op::Rect { .. } => None,
                })
                .collect()
        }

        #[test]
        fn test_small_invoice_is_one_page() {
            let rendered = render(&invoice(2)).unwrap();
            assert!(rendered.bytes.starts_with(b"%PDF"));
            assert_eq!(rendered.pages, 1);
        }

        #[test]
        fn test_long_invoice_paginates() {
            let pages = plan(&invoice(60));
            assert!(pages.len() >= 2);
            // every page after the first opens with the table header
            for page in &pages[1..] {
                assert!(matches!(&page[0], Op::Text { text, .. } if text == "Product Name"));
            }

            let rendered = render(&invoice(60)).unwrap();
            assert_eq!(rendered.pages, pages.len());
            assert!(rendered.bytes.starts_with(b"%PDF"));
        }

        #[test]
        fn test_summary_matches_text_invoice() {
            let invoice = invoice(3);
            let pages = plan(&invoice);
            let drawn = texts(&pages);
            let text = invoice.render_text();

            for row in &invoice.summary {
                let label = format!("{}:", row.label);
                assert!(drawn.contains(&label.as_str()), "PDF lacks {}", label);
                assert!(drawn.contains(&row.amount.as_str()), "PDF lacks {}", row.amount);
                assert!(text.contains(&label) && text.contains(&row.amount));
            }
            assert!(drawn.contains(&"Tax (18%):"));
            assert!(drawn.contains(&"Thank you for shopping with SuperMart!"));
        }

        #[test]
        fn test_fit_truncates_to_width() {
            let long = "Taaza Toned Milk 500ml (Amul) Family Value Pack";
            let fitted = fit(long, 10.0, 76.0);
            assert!(fitted.len() < long.len());
            assert!(text_width(&fitted, 10.0) <= 76.0);
            assert_eq!(fit("Milk", 10.0, 76.0), "Milk");
        }

        #[test]
        fn test_render_pdf_returns_document_bytes() {
            let bytes = super::super::render_pdf(&invoice(3)).unwrap();
            assert!(bytes.starts_with(b"%PDF"));
            assert!(super::super::pdf_available());
        }
    }
}
