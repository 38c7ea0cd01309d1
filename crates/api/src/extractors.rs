//! Request extractors.

use std::convert::Infallible;

use anichart_common::IdGenerator;
use anichart_core::{Voter, VoterIdentity};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie holding the anonymous voter token.
pub const VOTER_COOKIE: &str = "anichart_voter";

/// Header carrying the client address, set by the reverse proxy.
const REAL_IP_HEADER: &str = "x-real-ip";

/// Member identity placed in request extensions by the authentication layer.
#[derive(Debug, Clone)]
pub struct AuthenticatedMember {
    /// Member id.
    pub member_id: String,
    /// Whether the member may use admin routes.
    pub is_admin: bool,
}

/// The caller of a voting endpoint.
///
/// Anonymous callers without a voter cookie get a fresh token, returned
/// through [`CurrentVoter::issued_cookie`].
#[derive(Debug, Clone)]
pub struct CurrentVoter {
    /// Identity and network of the caller.
    pub voter: Voter,
    issued_token: Option<String>,
}

impl CurrentVoter {
    /// Cookie to set when a token was issued for this request.
    #[must_use]
    pub fn issued_cookie(&self) -> Option<Cookie<'static>> {
        self.issued_token.clone().map(|token| {
            Cookie::build((VOTER_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .permanent()
                .build()
        })
    }

    /// Response cookie jar carrying the issued token, if any.
    #[must_use]
    pub fn jar(&self) -> CookieJar {
        match self.issued_cookie() {
            Some(cookie) => CookieJar::new().add(cookie),
            None => CookieJar::new(),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentVoter
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let network = parts
            .headers
            .get(REAL_IP_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if let Some(member) = parts.extensions.get::<AuthenticatedMember>() {
            return Ok(Self {
                voter: Voter {
                    identity: VoterIdentity::Member {
                        member_id: member.member_id.clone(),
                    },
                    network,
                },
                issued_token: None,
            });
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let (token, issued_token) = match jar.get(VOTER_COOKIE).map(Cookie::value) {
            Some(token) if !token.is_empty() => (token.to_string(), None),
            _ => {
                let token = IdGenerator::new().voter_token();
                (token.clone(), Some(token))
            }
        };

        Ok(Self {
            voter: Voter {
                identity: VoterIdentity::Anonymous { token },
                network,
            },
            issued_token,
        })
    }
}
