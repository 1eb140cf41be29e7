pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::logout_all)
            .service(users::me),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::task_stats)
            .service(tasks::completion_trend)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(tasks::create_subtask)
            .service(tasks::update_subtask)
            .service(tasks::delete_subtask),
    );
}
