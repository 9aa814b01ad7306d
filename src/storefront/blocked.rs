//! Detection of CAPTCHA and error pages served in place of real content.

use crate::storefront::selectors::errors;
use scraper::Html;
use std::fmt;

/// A page the storefront served instead of the requested content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPage {
    Captcha,
    ErrorPage,
}

impl fmt::Display for BlockPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockPage::Captcha => write!(f, "CAPTCHA page (requests are being blocked)"),
            BlockPage::ErrorPage => write!(f, "storefront error page (service unavailable)"),
        }
    }
}

/// Returns the kind of block page, if the document is one.
pub fn detect(document: &Html) -> Option<BlockPage> {
    if document.select(&errors::CAPTCHA).next().is_some() {
        return Some(BlockPage::Captcha);
    }

    if document.select(&errors::DOG_PAGE).next().is_some() {
        return Some(BlockPage::ErrorPage);
    }

    None
}
