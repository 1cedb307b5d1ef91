//! Data-fetching hooks
//!
//! Each read runs through the query cache under its resource key and
//! staleness window; each write runs once, then invalidates every read it
//! could have made stale. Failures always end in a toast (except a rejected
//! session, which redirects instead).
//!
//! | Read | Key | Fresh for |
//! |------|-----|-----------|
//! | company list | `companies/list/..` | 5 min |
//! | company detail | `company/<id>` | 5 min |
//! | sales status | `sales-status/<id>` | 5 min |
//! | sales status list | `sales-statuses/..` | 5 min |
//! | sales dashboard | `sales-dashboard` | 2 min |
//! | upcoming follow-ups | `upcoming-follow-ups/<days>` | 5 min |
//! | conversion analytics | `conversion-analytics/<period>` | 10 min |
//! | scraping status | `scraping-status` | always refetched |
//! | scraping history | `scraping-history/..` | 2 min |
//! | scraping config | `scraping-config` | 10 min |
//! | export stats | `export-stats` | always refetched |

pub mod companies;
pub mod export;
pub mod health;
pub mod sales;
pub mod scraping;
