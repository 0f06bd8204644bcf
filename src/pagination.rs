// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drain offset-paginated listing endpoints into one labeled sequence
// role: fetch/pagination
// inputs: (label, query) categories and a page-fetching closure taking (query, startAt)
// outputs: Vec<Labeled<L, T>> in category order, then page-arrival order
// invariants:
// - Offset advances by the number of records actually returned
// - Stops on an explicit last-page flag OR an empty page (never loops on inconsistent flags)
// errors: The first failing page aborts the whole fetch
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::Deserialize;

/// One page of a listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
  #[serde(default = "Vec::new")]
  pub values: Vec<T>,
  // A page that does not say otherwise is treated as the last one.
  #[serde(rename = "isLast", default = "last_by_default")]
  pub is_last: bool,
}

fn last_by_default() -> bool {
  true
}

impl<T> Page<T> {
  pub fn new(values: Vec<T>, is_last: bool) -> Self {
    Self { values, is_last }
  }
}

/// A record tagged with the category it was listed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Labeled<L, T> {
  pub label: L,
  pub record: T,
}

/// Fetch every page of every category.
///
/// `fetch_page` receives the category query and the current offset. Results are
/// concatenated per category in call order, so there is no interleaving.
pub fn fetch_all_pages<L, Q, T, E, F>(categories: &[(L, Q)], mut fetch_page: F) -> Result<Vec<Labeled<L, T>>, E>
where
  L: Clone + std::fmt::Debug,
  F: FnMut(&Q, usize) -> Result<Page<T>, E>,
{
  let mut out: Vec<Labeled<L, T>> = Vec::new();

  for (label, query) in categories {
    let mut start_at = 0usize;

    loop {
      let page = fetch_page(query, start_at)?;
      let count = page.values.len();
      tracing::debug!(?label, start_at, count, is_last = page.is_last, "fetched page");

      out.extend(page.values.into_iter().map(|record| Labeled {
        label: label.clone(),
        record,
      }));

      if page.is_last || count == 0 {
        break;
      }
      start_at += count;
    }
  }

  Ok(out)
}
