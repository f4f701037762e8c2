//! Request and response shapes for page creation, as an HTTP layer sees them.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use wikistore_core::error::WikiError;
use wikistore_core::path::{is_wiki_word, WikiPath};
use wikistore_store::page::WikiPage;

use crate::policy::{AddChildOutcome, AddChildPolicy, ChildPage, PageType, Rejection};

pub const SEE_OTHER: u16 = 303;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const CONFLICT: u16 = 409;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// The page-creation form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddChildRequest {
    /// Dotted path of the parent page.
    pub resource: String,
    pub page_name: String,
    pub page_content: String,
    /// `""`, `Static`, `Test` or `Suite`.
    pub page_type: String,
    pub help_text: Option<String>,
    pub suites: Option<String>,
    pub author: Option<String>,
}

/// What the outer layer sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub body: String,
}

impl Response {
    fn redirect(location: String) -> Self {
        Self {
            status: SEE_OTHER,
            location: Some(location),
            body: String::new(),
        }
    }

    fn rejected(rejection: &Rejection) -> Self {
        let status = match rejection {
            Rejection::InvalidChildName(_) | Rejection::InvalidPageType(_) => BAD_REQUEST,
            Rejection::ParentNotFound(_) => NOT_FOUND,
            Rejection::ChildExists(_) => CONFLICT,
        };
        Self {
            status,
            location: None,
            body: rejection.to_string(),
        }
    }

    fn failed(err: &WikiError) -> Self {
        Self {
            status: INTERNAL_SERVER_ERROR,
            location: None,
            body: err.to_string(),
        }
    }
}

impl From<AddChildOutcome> for Response {
    fn from(outcome: AddChildOutcome) -> Self {
        match outcome {
            AddChildOutcome::Created(path) => Self::redirect(path.qualified_name()),
            AddChildOutcome::Rejected(rejection) => Self::rejected(&rejection),
        }
    }
}

/// Handle a page-creation request against the tree rooted at `root`.
///
/// Storage failures become a `500` response; nothing here returns an error.
pub fn add_child_page<P: WikiPage>(root: &P, request: &AddChildRequest) -> Response {
    match run(root, request) {
        Ok(outcome) => {
            if let AddChildOutcome::Rejected(rejection) = &outcome {
                warn!(code = rejection.code(), resource = %request.resource, "{rejection}");
            }
            outcome.into()
        }
        Err(err) => {
            error!(resource = %request.resource, error = %err, "page creation failed");
            Response::failed(&err)
        }
    }
}

fn run<P: WikiPage>(root: &P, request: &AddChildRequest) -> Result<AddChildOutcome, WikiError> {
    if !is_wiki_word(&request.page_name) {
        return Ok(AddChildOutcome::Rejected(Rejection::InvalidChildName(
            request.page_name.clone(),
        )));
    }
    let page_type = match PageType::from_form(&request.page_type) {
        Ok(page_type) => page_type,
        Err(e) => {
            return Ok(AddChildOutcome::Rejected(Rejection::InvalidPageType(e.0)));
        }
    };

    let parent_missing = || -> Result<AddChildOutcome, WikiError> {
        Ok(AddChildOutcome::Rejected(Rejection::ParentNotFound(
            request.resource.clone(),
        )))
    };
    let Some(parent_path) = WikiPath::parse(&request.resource)
        .ok()
        .and_then(|path| path.resolve(&WikiPath::root()))
    else {
        return parent_missing();
    };
    let Some(parent) = root.page_at(&parent_path)? else {
        return parent_missing();
    };

    AddChildPolicy::create(
        &parent,
        &ChildPage {
            name: &request.page_name,
            content: &request.page_content,
            page_type,
            help_text: request.help_text.as_deref(),
            suites: request.suites.as_deref(),
            author: request.author.as_deref(),
        },
    )
}
