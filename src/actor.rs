use actix_web::error::{ErrorForbidden, ErrorUnauthorized};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::model::worker::{Role, WorkerId};

/// Caller identity as asserted by the gateway in front of this service.
/// Authentication itself happens upstream; by the time a request lands
/// here the gateway has already verified the session and stamped these
/// headers.
pub struct Actor {
    pub worker_id: WorkerId,
    pub role: Role,
}

impl FromRequest for Actor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let worker_id = match req
            .headers()
            .get("X-Worker-Id")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.trim().parse::<WorkerId>().ok())
        {
            Some(id) => id,
            None => return ready(Err(ErrorUnauthorized("Missing or bad X-Worker-Id header"))),
        };

        let role = match req
            .headers()
            .get("X-Worker-Role")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.trim().parse::<Role>().ok())
        {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Missing or bad X-Worker-Role header"))),
        };

        ready(Ok(Actor { worker_id, role }))
    }
}

impl Actor {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }

    /// Schedule writes are for the planning roles.
    pub fn require_planner(&self) -> actix_web::Result<()> {
        if self.role.is_planner() {
            Ok(())
        } else {
            Err(ErrorForbidden("Supervisor/Admin only"))
        }
    }
}
