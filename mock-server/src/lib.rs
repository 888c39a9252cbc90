use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub code: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub passenger: String,
    pub route: String,
    pub supplier_code: String,
    pub price: i64,
    pub status: String,
}

#[derive(Deserialize)]
pub struct CreateTicket {
    pub passenger: String,
    pub route: String,
    pub supplier_code: String,
    pub price: i64,
    #[serde(default = "pending")]
    pub status: String,
}

#[derive(Deserialize)]
pub struct UpdateTicket {
    pub passenger: Option<String>,
    pub route: Option<String>,
    pub price: Option<i64>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Register {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub action: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
}

fn pending() -> String {
    "pending".to_string()
}

pub struct Db {
    pub tickets: RwLock<HashMap<Uuid, Ticket>>,
    /// username -> (password, user)
    pub users: RwLock<HashMap<String, (String, User)>>,
    pub information: HashMap<&'static str, Vec<Record>>,
}

pub type SharedDb = Arc<Db>;

fn record(id: u64, code: &str, name: &str) -> Record {
    Record {
        id,
        code: code.to_string(),
        name: name.to_string(),
    }
}

fn seed() -> Db {
    let mut information = HashMap::new();
    information.insert(
        "suppliers",
        vec![
            record(1, "TG", "Thai Airways"),
            record(2, "FD", "Thai AirAsia"),
            record(3, "PG", "Bangkok Airways"),
        ],
    );
    information.insert(
        "customers",
        vec![
            record(1, "C001", "Siam Travel Co."),
            record(2, "C002", "Northern Tours"),
        ],
    );
    information.insert(
        "types",
        vec![record(1, "AIR", "Air ticket"), record(2, "BUS", "Bus ticket")],
    );

    let agent = User {
        id: Uuid::new_v4(),
        username: "agent".to_string(),
        email: "agent@agency.test".to_string(),
        full_name: Some("Front Desk".to_string()),
    };
    let mut users = HashMap::new();
    users.insert(agent.username.clone(), ("secret".to_string(), agent));

    Db {
        tickets: RwLock::new(HashMap::new()),
        users: RwLock::new(users),
        information,
    }
}

pub fn app() -> Router {
    let db: SharedDb = Arc::new(seed());
    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/information", get(list_information))
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route(
            "/tickets/{id}",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        );
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn page<T: Serialize + Clone>(items: &[T], query: &ListQuery) -> Json<serde_json::Value> {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);
    let data: Vec<T> = items.iter().skip(offset).take(limit).cloned().collect();
    Json(json!({ "data": { "data": data, "total": items.len() } }))
}

fn search_hit(search: &Option<String>, fields: &[&str]) -> bool {
    match search {
        Some(needle) if !needle.is_empty() => {
            let needle = needle.to_lowercase();
            fields.iter().any(|f| f.to_lowercase().contains(&needle))
        }
        _ => true,
    }
}

fn session(user: &User) -> serde_json::Value {
    json!({ "data": { "token": format!("token-{}", Uuid::new_v4()), "user": user } })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn login(State(db): State<SharedDb>, Json(input): Json<Login>) -> Json<serde_json::Value> {
    let users = db.users.read().await;
    match users.get(&input.username) {
        Some((password, user)) if *password == input.password => Json(session(user)),
        _ => Json(json!({ "error": "Invalid credentials" })),
    }
}

async fn register(State(db): State<SharedDb>, Json(input): Json<Register>) -> Response {
    let mut users = db.users.write().await;
    if users.contains_key(&input.username) {
        let body = json!({
            "error": { "message": "Username already taken", "code": "USER_EXISTS" }
        });
        return Json(body).into_response();
    }
    let user = User {
        id: Uuid::new_v4(),
        username: input.username.clone(),
        email: input.email,
        full_name: input.full_name,
    };
    let body = session(&user);
    users.insert(input.username, (input.password, user));
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn list_information(
    State(db): State<SharedDb>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let action = query.action.clone().unwrap_or_default();
    let records = db
        .information
        .get(action.as_str())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown action: {action}")))?;
    let filtered: Vec<Record> = records
        .iter()
        .filter(|r| search_hit(&query.search, &[r.code.as_str(), r.name.as_str()]))
        .cloned()
        .collect();
    Ok(page(&filtered, &query))
}

async fn list_tickets(
    State(db): State<SharedDb>,
    Query(query): Query<ListQuery>,
) -> Json<serde_json::Value> {
    let tickets = db.tickets.read().await;
    let mut filtered: Vec<Ticket> = tickets
        .values()
        .filter(|t| search_hit(&query.search, &[t.passenger.as_str(), t.route.as_str()]))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| a.passenger.cmp(&b.passenger).then(a.id.cmp(&b.id)));
    page(&filtered, &query)
}

async fn create_ticket(
    State(db): State<SharedDb>,
    Json(input): Json<CreateTicket>,
) -> (StatusCode, Json<serde_json::Value>) {
    let ticket = Ticket {
        id: Uuid::new_v4(),
        passenger: input.passenger,
        route: input.route,
        supplier_code: input.supplier_code,
        price: input.price,
        status: input.status,
    };
    db.tickets.write().await.insert(ticket.id, ticket.clone());
    (StatusCode::CREATED, Json(json!({ "data": ticket })))
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "ticket not found".to_string())
}

async fn get_ticket(
    State(db): State<SharedDb>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let tickets = db.tickets.read().await;
    let ticket = tickets.get(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "data": ticket })))
}

async fn update_ticket(
    State(db): State<SharedDb>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTicket>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let mut tickets = db.tickets.write().await;
    let ticket = tickets.get_mut(&id).ok_or_else(not_found)?;
    if let Some(passenger) = input.passenger {
        ticket.passenger = passenger;
    }
    if let Some(route) = input.route {
        ticket.route = route;
    }
    if let Some(price) = input.price {
        ticket.price = price;
    }
    if let Some(status) = input.status {
        ticket.status = status;
    }
    Ok(Json(json!({ "data": ticket })))
}

async fn delete_ticket(
    State(db): State<SharedDb>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut tickets = db.tickets.write().await;
    tickets
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<usize>, offset: Option<usize>) -> ListQuery {
        ListQuery {
            action: None,
            limit,
            offset,
            search: None,
        }
    }

    #[test]
    fn page_applies_offset_and_limit_but_reports_full_total() {
        let items = vec![1, 2, 3, 4, 5];
        let Json(body) = page(&items, &query(Some(2), Some(1)));
        assert_eq!(body["data"]["data"], json!([2, 3]));
        assert_eq!(body["data"]["total"], 5);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let search = Some("airasia".to_string());
        assert!(search_hit(&search, &["FD", "Thai AirAsia"]));
        assert!(!search_hit(&search, &["TG", "Thai Airways"]));
        assert!(search_hit(&None, &["anything"]));
        assert!(search_hit(&Some(String::new()), &["anything"]));
    }

    #[test]
    fn create_ticket_defaults_status_to_pending() {
        let input: CreateTicket = serde_json::from_str(
            r#"{"passenger":"Somchai","route":"BKK-HKT","supplier_code":"TG","price":1}"#,
        )
        .unwrap();
        assert_eq!(input.status, "pending");
    }

    #[test]
    fn seed_has_all_lookup_tables() {
        let db = seed();
        for action in ["suppliers", "customers", "types"] {
            assert!(!db.information[action].is_empty(), "{action}");
        }
        assert_eq!(db.information["suppliers"][0].code, "TG");
    }
}
