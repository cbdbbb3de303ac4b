pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Wires the `/api` surface. Auth endpoints are open; `changePassword` and
/// everything under `tasks` sit behind the access-token guard.
///
/// `filter` is registered before `{id}` so it is matched as a literal
/// segment, not captured as a task id.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::refresh)
        .service(
            web::scope("/changePassword")
                .wrap(AuthMiddleware)
                .service(auth::change_password),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::filter_tasks)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
