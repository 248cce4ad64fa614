//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::TokenService;
use crate::domain::{InvestorProfile, OperationContext};
use crate::error::AppError;
use crate::handlers::{
    AuthResult, ConvertCommand, ConvertHandler, LoginCommand, LoginHandler, ProfileHandler,
    RegisterCommand, RegisterHandler, SetProfileCommand, TransferCommand, TransferHandler,
};
use crate::state::AppState;
use crate::store::{self, TransactionRecord, TransactionView, WalletView};

use super::middleware::{auth_middleware, request_context, RequestUser};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub access_token: String,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            user: PublicUser {
                name: result.name,
                email: result.email,
            },
            access_token: result.access_token,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub op_coins: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub updated_op_coin_balance: Decimal,
    #[serde(rename = "updatedBRLCoinBalance")]
    pub updated_brl_coin_balance: Decimal,
    pub new_transaction: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Recipient email
    pub email: String,
    /// Coin symbol
    pub amount_coin: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub new_balance: Decimal,
    pub amount: Decimal,
    pub amount_coin: String,
    pub new_transaction: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub profile: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: InvestorProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router.
///
/// Everything except register and login sits behind bearer token auth.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    let protected = Router::new()
        .route("/wallets", get(get_wallets))
        .route("/wallets/convert", patch(convert))
        .route("/wallets/transfer", post(transfer))
        .route("/transactions", get(get_transactions))
        .route(
            "/users/profile",
            get(get_profile)
                .post(create_profile)
                .put(update_profile)
                .delete(delete_profile),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    public.merge(protected).with_state(state)
}

// =========================================================================
// POST /auth/register, POST /auth/login
// =========================================================================

/// Register a user with OPCOIN and BRL wallets
async fn register(
    State(pool): State<PgPool>,
    State(tokens): State<TokenService>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(request) = payload?;
    let handler = RegisterHandler::new(pool, tokens);
    let command = RegisterCommand::new(&request.email, request.password, &request.name);

    let result = handler.execute(command, &request_context(&headers)).await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Exchange credentials for an access token
async fn login(
    State(pool): State<PgPool>,
    State(tokens): State<TokenService>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(request) = payload?;
    let handler = LoginHandler::new(pool, tokens);
    let command = LoginCommand::new(&request.email, request.password);

    let result = handler.execute(command, &request_context(&headers)).await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

// =========================================================================
// Wallets
// =========================================================================

/// All wallets of the caller
async fn get_wallets(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
) -> Result<Json<Vec<WalletView>>, AppError> {
    let wallets = store::wallets::list_for_user(&pool, user.user_id).await?;
    Ok(Json(wallets))
}

/// Convert OPCOIN into BRL
async fn convert(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, AppError> {
    let Json(request) = payload?;
    let handler = ConvertHandler::new(pool);
    let command = ConvertCommand::new(user.user_id, request.op_coins);

    let result = handler.execute(command, &context).await?;

    Ok(Json(ConvertResponse {
        updated_op_coin_balance: result.op_coin_balance,
        updated_brl_coin_balance: result.brl_balance,
        new_transaction: vec![result.transaction],
    }))
}

/// Send coins to another user by email
async fn transfer(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferResponse>), AppError> {
    let Json(request) = payload?;
    let handler = TransferHandler::new(pool);
    let command = TransferCommand::new(
        user.user_id,
        &request.email,
        &request.amount_coin,
        request.amount,
    );

    let result = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransferResponse {
            new_balance: result.new_balance,
            amount: result.amount,
            amount_coin: result.coin_symbol,
            new_transaction: vec![result.transaction],
        }),
    ))
}

// =========================================================================
// GET /transactions
// =========================================================================

/// The caller's ledger rows, newest first
async fn get_transactions(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
) -> Result<Json<Vec<TransactionView>>, AppError> {
    let transactions = store::transactions::list_for_user(&pool, user.user_id).await?;
    Ok(Json(transactions))
}

// =========================================================================
// /users/profile
// =========================================================================

async fn get_profile(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let record = ProfileHandler::new(pool).get(user.user_id).await?;

    Ok(Json(ProfileResponse {
        profile: record.profile,
        message: None,
    }))
}

async fn create_profile(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let Json(request) = payload?;
    let command = SetProfileCommand::new(user.user_id, request.profile);
    let record = ProfileHandler::new(pool).create(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            profile: record.profile,
            message: Some("Profile created".to_string()),
        }),
    ))
}

async fn update_profile(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let Json(request) = payload?;
    let command = SetProfileCommand::new(user.user_id, request.profile);
    let record = ProfileHandler::new(pool).update(command, &context).await?;

    Ok(Json(ProfileResponse {
        profile: record.profile,
        message: Some("Profile updated".to_string()),
    }))
}

async fn delete_profile(
    State(pool): State<PgPool>,
    Extension(user): Extension<RequestUser>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<MessageResponse>, AppError> {
    ProfileHandler::new(pool).delete(user.user_id, &context).await?;

    Ok(Json(MessageResponse {
        message: "Profile deleted".to_string(),
    }))
}
