use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{money::MoneyAmount, payment::Payment},
        infra::postgres::payment_repo,
    },
    axum::{
        extract::{Query, State},
        response::Html,
    },
    serde::Deserialize,
    std::fmt::Write,
};

/// Rows shown per admin page.
pub const PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based. Kept as a string so a garbled value falls back to page 1
    /// instead of failing extraction.
    pub page: Option<String>,
}

/// ceil(total / page_size); zero pages for an empty store.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    debug_assert!(page_size > 0);
    (total + page_size - 1) / page_size
}

/// Clamp a requested page into range: below-range requests go to page 1,
/// beyond-range requests to the last page, and an empty store always
/// resolves to page 1 (shown as an empty page, never an error).
pub fn clamp_page(requested: i64, total_pages: i64) -> i64 {
    requested.max(1).min(total_pages.max(1))
}

/// The up-to-5-wide run of page numbers around the current page.
pub fn page_window(current: i64, total_pages: i64) -> Vec<i64> {
    let width = 5.min(total_pages.max(0));
    (0..width)
        .map(|i| {
            if total_pages <= 5 || current <= 3 {
                i + 1
            } else if current >= total_pages - 2 {
                total_pages - 4 + i
            } else {
                current - 2 + i
            }
        })
        .collect()
}

pub struct ListingPage {
    pub payments: Vec<Payment>,
    pub page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub total_amount: MoneyAmount,
}

/// GET /admin: paginated payment listing with an aggregate header.
pub async fn admin_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, ApiError> {
    let requested = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(1);

    let total_count = payment_repo::count_all(&state.pool).await?;
    let pages = total_pages(total_count, PAGE_SIZE);
    let page = clamp_page(requested, pages);

    let payments = payment_repo::list_page(&state.pool, PAGE_SIZE, (page - 1) * PAGE_SIZE).await?;
    let total_amount = payment_repo::sum_amounts(&state.pool).await?;

    Ok(Html(render_listing(&ListingPage {
        payments,
        page,
        total_pages: pages,
        total_count,
        total_amount,
    })))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

fn render_row(html: &mut String, p: &Payment) {
    let status = p.status.as_str();
    let _ = write!(
        html,
        r#"<tr>
<td>{date}</td>
<td class="amount">{amount}</td>
<td class="currency">{currency}</td>
<td><span class="badge badge-{status}">{status}</span></td>
<td class="mono">{session}</td>
<td>{email}</td>
</tr>
"#,
        date = p.created_at.format("%d/%m/%Y %H:%M"),
        amount = p.money.amount().format_major(),
        currency = escape(&p.money.currency().as_str().to_ascii_uppercase()),
        status = status,
        session = escape(p.session_id.as_str()),
        email = escape(&p.customer_email),
    );
}

fn render_pagination(html: &mut String, page: i64, total_pages: i64) {
    let _ = write!(html, r#"<nav class="pagination"><span>Page {page} of {}</span>"#, total_pages.max(1));

    if page > 1 {
        let _ = write!(html, r#" <a href="?page={}">&laquo; prev</a>"#, page - 1);
    }
    for n in page_window(page, total_pages) {
        if n == page {
            let _ = write!(html, r#" <span class="current">{n}</span>"#);
        } else {
            let _ = write!(html, r#" <a href="?page={n}">{n}</a>"#);
        }
    }
    if page < total_pages {
        let _ = write!(html, r#" <a href="?page={}">next &raquo;</a>"#, page + 1);
    }
    html.push_str("</nav>\n");
}

pub fn render_listing(listing: &ListingPage) -> String {
    let mut html = String::from(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Payments admin</title>
<style>
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 64rem; color: #1a1a1a; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 1px solid #e5e5e5; }
.summary { background: #1d4ed8; color: #fff; border-radius: 0.5rem; padding: 1.25rem; margin-bottom: 1.5rem; }
.summary .total { font-size: 1.8rem; font-weight: 700; }
.mono { font-family: monospace; font-size: 0.8rem; }
.badge { border-radius: 9999px; padding: 0.1rem 0.6rem; font-size: 0.75rem; }
.badge-completed { background: #dcfce7; color: #166534; }
.badge-pending { background: #fef9c3; color: #854d0e; }
.badge-failed { background: #fee2e2; color: #991b1b; }
.pagination { margin-top: 1.5rem; }
.pagination a, .pagination .current { padding: 0.25rem 0.6rem; }
.pagination .current { font-weight: 700; }
.empty { text-align: center; color: #666; padding: 2rem 0; }
</style>
</head>
<body>
<h1>Payments admin</h1>
"#,
    );

    let _ = write!(
        html,
        r#"<div class="summary">
<div>Total collected</div>
<div class="total">{total}</div>
<div>{count} payment(s) recorded</div>
</div>
"#,
        total = listing.total_amount.format_major(),
        count = listing.total_count,
    );

    if listing.payments.is_empty() {
        html.push_str(r#"<p class="empty">No payments recorded yet.</p>"#);
        html.push('\n');
    } else {
        let first = (listing.page - 1) * PAGE_SIZE + 1;
        let last = ((listing.page - 1) * PAGE_SIZE + listing.payments.len() as i64)
            .min(listing.total_count);
        let _ = write!(
            html,
            "<p>Showing {first}\u{2013}{last} of {}</p>\n",
            listing.total_count
        );

        html.push_str(
            "<table>\n<thead><tr><th>Date</th><th>Amount</th><th>Currency</th><th>Status</th><th>Session</th><th>Email</th></tr></thead>\n<tbody>\n",
        );
        for p in &listing.payments {
            render_row(&mut html, p);
        }
        html.push_str("</tbody>\n</table>\n");
    }

    render_pagination(&mut html, listing.page, listing.total_pages);
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(120, 50), 3);
    }

    #[test]
    fn clamp_out_of_range_pages() {
        // Below range → page 1.
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(-7, 3), 1);
        // Beyond range → last page.
        assert_eq!(clamp_page(9, 3), 3);
        // Empty store → page 1 regardless.
        assert_eq!(clamp_page(1, 0), 1);
        assert_eq!(clamp_page(42, 0), 1);
        // In range untouched.
        assert_eq!(clamp_page(2, 3), 2);
    }

    #[test]
    fn page_window_short_listing_shows_everything() {
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 0), Vec::<i64>::new());
    }

    #[test]
    fn page_window_slides_with_current_page() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(8, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<a b="c">&'"#),
            "&lt;a b=&quot;c&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn empty_listing_renders_empty_state() {
        let html = render_listing(&ListingPage {
            payments: vec![],
            page: 1,
            total_pages: 0,
            total_count: 0,
            total_amount: MoneyAmount::ZERO,
        });
        assert!(html.contains("No payments recorded yet."));
        assert!(html.contains("0.00"));
        assert!(html.contains("Page 1 of 1"));
    }
}
