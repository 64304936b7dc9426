//! Fail-safe navigation guard.
//!
//! Independent of the compiled-rule engine: even if a navigation slips past
//! the blocking layer, this check re-evaluates the target URL on its own.
//! It runs only while a session is focusing, checks internal browser pages
//! before the block-list, and short-circuits on the first match -- one
//! redirect per navigation, never two.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::rules::BlockList;
use crate::session::SessionState;

/// Pages that would let the user disable enforcement or erase evidence of
/// navigation. Fixed, not configurable.
pub const INTERNAL_PAGES: [&str; 3] = [
    "chrome://extensions",
    "chrome://settings",
    "chrome://history",
];

/// Why a navigation was redirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    InternalPage { page: String },
    BlockedSite { entry: String },
    BlockedKeyword { entry: String },
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GuardVerdict {
    Allow,
    Redirect {
        target: String,
        #[serde(flatten)]
        reason: BlockReason,
    },
}

impl GuardVerdict {
    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardVerdict::Redirect { .. })
    }
}

/// Redundant enforcement path; reads state, never writes it.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    dashboard_url: String,
}

impl NavigationGuard {
    pub fn new(dashboard_url: impl Into<String>) -> Self {
        Self {
            dashboard_url: dashboard_url.into(),
        }
    }

    pub fn dashboard_url(&self) -> &str {
        &self.dashboard_url
    }

    /// Evaluate a navigated-to URL. Skipped entirely while idle.
    pub fn check(&self, state: &SessionState, list: &BlockList, raw_url: &str) -> GuardVerdict {
        if !state.is_focusing {
            return GuardVerdict::Allow;
        }

        let lowered = raw_url.trim().to_lowercase();

        for page in INTERNAL_PAGES {
            if lowered.starts_with(page) {
                tracing::info!(url = raw_url, page, "redirecting internal page");
                return self.redirect(BlockReason::InternalPage {
                    page: page.to_string(),
                });
            }
        }

        let haystack = host_and_path(&lowered);

        for entry in list.sites() {
            if haystack.contains(entry.as_str()) {
                tracing::info!(url = raw_url, entry = %entry, "redirecting blocked site");
                return self.redirect(BlockReason::BlockedSite {
                    entry: entry.clone(),
                });
            }
        }

        for entry in list.keywords() {
            if haystack.contains(entry.as_str()) {
                tracing::info!(url = raw_url, entry = %entry, "redirecting blocked keyword");
                return self.redirect(BlockReason::BlockedKeyword {
                    entry: entry.clone(),
                });
            }
        }

        GuardVerdict::Allow
    }

    fn redirect(&self, reason: BlockReason) -> GuardVerdict {
        GuardVerdict::Redirect {
            target: self.dashboard_url.clone(),
            reason,
        }
    }
}

/// host + path of a URL; unparseable input falls back to the whole string
/// so the fail-safe never silently allows it.
fn host_and_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or(""), parsed.path()),
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focusing() -> SessionState {
        SessionState {
            is_focusing: true,
            end_time: u64::MAX,
            unlock_phrase: "hunter2".into(),
        }
    }

    fn list(sites: &[&str], keywords: &[&str]) -> BlockList {
        let mut l = BlockList::new();
        for s in sites {
            l.add_site(s);
        }
        for k in keywords {
            l.add_keyword(k);
        }
        l
    }

    fn guard() -> NavigationGuard {
        NavigationGuard::new("focusgate://dashboard")
    }

    #[test]
    fn skipped_entirely_while_idle() {
        let verdict = guard().check(
            &SessionState::idle(),
            &list(&["example.com"], &[]),
            "https://example.com/",
        );
        assert_eq!(verdict, GuardVerdict::Allow);
    }

    #[test]
    fn internal_pages_are_redirected() {
        for url in [
            "chrome://settings",
            "chrome://settings/privacy",
            "chrome://extensions/?id=abc",
            "chrome://history",
        ] {
            let verdict = guard().check(&focusing(), &BlockList::new(), url);
            assert!(verdict.is_redirect(), "expected redirect for {url}");
        }
    }

    #[test]
    fn internal_page_check_wins_over_block_list() {
        // A URL matching both an internal page and a blocked keyword must
        // produce exactly one redirect, attributed to the internal page.
        let verdict = guard().check(
            &focusing(),
            &list(&[], &["settings"]),
            "chrome://settings/clearBrowserData",
        );
        match verdict {
            GuardVerdict::Redirect { target, reason } => {
                assert_eq!(target, "focusgate://dashboard");
                assert_eq!(
                    reason,
                    BlockReason::InternalPage {
                        page: "chrome://settings".into()
                    }
                );
            }
            GuardVerdict::Allow => panic!("expected redirect"),
        }
    }

    #[test]
    fn blocked_site_matches_host_and_path() {
        let verdict = guard().check(
            &focusing(),
            &list(&["example.com"], &[]),
            "https://EXAMPLE.com/page?utm=1",
        );
        assert_eq!(
            verdict,
            GuardVerdict::Redirect {
                target: "focusgate://dashboard".into(),
                reason: BlockReason::BlockedSite {
                    entry: "example.com".into()
                }
            }
        );
    }

    #[test]
    fn site_check_runs_before_keyword_check() {
        let verdict = guard().check(
            &focusing(),
            &list(&["reddit.com"], &["reddit"]),
            "https://reddit.com/r/all",
        );
        assert_eq!(
            verdict,
            GuardVerdict::Redirect {
                target: "focusgate://dashboard".into(),
                reason: BlockReason::BlockedSite {
                    entry: "reddit.com".into()
                }
            }
        );
    }

    #[test]
    fn keyword_matches_inside_path() {
        let verdict = guard().check(
            &focusing(),
            &list(&[], &["games"]),
            "https://store.example.org/games/new",
        );
        assert!(verdict.is_redirect());
    }

    #[test]
    fn query_string_is_not_inspected() {
        let verdict = guard().check(
            &focusing(),
            &list(&[], &["games"]),
            "https://search.example.org/q?term=games",
        );
        assert_eq!(verdict, GuardVerdict::Allow);
    }

    #[test]
    fn unparseable_input_falls_back_to_containment() {
        let verdict = guard().check(&focusing(), &list(&["example.com"], &[]), "example.com/page");
        assert!(verdict.is_redirect());
    }

    #[test]
    fn unrelated_urls_are_allowed() {
        let verdict = guard().check(
            &focusing(),
            &list(&["example.com"], &["news"]),
            "https://docs.rs/url",
        );
        assert_eq!(verdict, GuardVerdict::Allow);
    }
}
