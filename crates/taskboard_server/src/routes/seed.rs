//! Demo-data seeding endpoint.
//!
//! Runs as one transaction: a second call fails on the duplicate-user rule
//! and leaves the store untouched.

use crate::dto::SeedResponse;
use crate::error::ApiErrorResponse;
use crate::state::{task_service, user_service, AppState};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Days, NaiveDate};
use log::{error, info};
use taskboard_core::{TaskDraft, TaskStatus, UserDraft};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/test/init-data", post(init_data))
}

/// Dates used by the demo records, resolved before the transaction opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SeedDates {
    joao_birth: NaiveDate,
    maria_birth: NaiveDate,
    first_due: NaiveDate,
    second_due: NaiveDate,
}

impl SeedDates {
    fn resolve(today: NaiveDate) -> Option<Self> {
        Some(Self {
            joao_birth: NaiveDate::from_ymd_opt(1990, 1, 15)?,
            maria_birth: NaiveDate::from_ymd_opt(1985, 5, 20)?,
            first_due: today.checked_add_days(Days::new(7))?,
            second_due: today.checked_add_days(Days::new(14))?,
        })
    }
}

async fn init_data(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiErrorResponse> {
    let today = state.clock().today();
    let dates = SeedDates::resolve(today).ok_or_else(|| {
        error!("event=seed_data module=http status=error error=date_out_of_range today={today}");
        ApiErrorResponse::internal_error()
    })?;

    let (users, tasks) = state
        .write(move |conn, clock| {
            let users = user_service(conn, clock)?;
            let joao = users.create(&UserDraft::new("João", "Silva", dates.joao_birth))?;
            let maria = users.create(&UserDraft::new("Maria", "Santos", dates.maria_birth))?;

            let tasks = task_service(conn, clock)?;
            tasks.create(&TaskDraft {
                title: Some("Implementar API REST".to_string()),
                description: Some("Desenvolver endpoints para gerenciamento de tarefas".to_string()),
                end_date: Some(dates.first_due),
                creator_id: Some(joao.id),
                assignee_id: Some(maria.id),
                tags: Some("desenvolvimento,api".to_string()),
                priority: Some(1),
                status: Some(TaskStatus::Todo.as_str().to_string()),
            })?;
            tasks.create(&TaskDraft {
                title: Some("Testar funcionalidades".to_string()),
                description: Some("Criar testes unitários e de integração".to_string()),
                end_date: Some(dates.second_due),
                creator_id: Some(maria.id),
                assignee_id: Some(joao.id),
                tags: Some("teste,qualidade".to_string()),
                priority: Some(2),
                status: Some(TaskStatus::InProgress.as_str().to_string()),
            })?;
            Ok((2, 2))
        })
        .await?;

    info!("event=seed_data module=http status=ok users={users} tasks={tasks}");
    Ok(Json(SeedResponse {
        message: "Test data initialized successfully".to_string(),
        users: format!("{users} users created"),
        tasks: format!("{tasks} tasks created"),
    }))
}

#[cfg(test)]
mod tests {
    use super::SeedDates;
    use chrono::NaiveDate;

    #[test]
    fn seed_dates_are_offsets_from_today() {
        let today = NaiveDate::from_ymd_opt(2030, 6, 15).unwrap();
        let dates = SeedDates::resolve(today).unwrap();
        assert_eq!(dates.joao_birth, NaiveDate::from_ymd_opt(1990, 1, 15).unwrap());
        assert_eq!(dates.maria_birth, NaiveDate::from_ymd_opt(1985, 5, 20).unwrap());
        assert_eq!(dates.first_due, NaiveDate::from_ymd_opt(2030, 6, 22).unwrap());
        assert_eq!(dates.second_due, NaiveDate::from_ymd_opt(2030, 6, 29).unwrap());
    }

    #[test]
    fn seed_dates_fail_without_room_after_today() {
        assert_eq!(SeedDates::resolve(NaiveDate::MAX), None);
    }
}
