use std::sync::Arc;

use axum::Router;
use log::{debug, error, info};

use crate::resource::AppState;
use crate::routes::create_router_with_state;
use wedding_shared::auth::{hash_secret, AuthConfig};
use wedding_shared::models::{Confirmation, Present};
use wedding_shared::store::dynamo::DynamoCollectionStore;
use wedding_shared::store::{CollectionStore, Record};
use wedding_shared::test_utils::dynamo_test_utils::{
    clear_dynamo_table, create_collection_table, create_dynamo_client, use_dynamodb,
};
use wedding_shared::test_utils::mock_store::MockCollectionStore;
use wedding_shared::test_utils::test_logging::init_test_logging;

pub const GUEST_KEY: &str = "guest-secret";
pub const DASHBOARD_KEY: &str = "dashboard-secret";
pub const GUEST_STATE_KEY: &str = "guest-state";
pub const DASHBOARD_STATE_KEY: &str = "dashboard-state";

// Constants for DynamoDB tests
const CONFIRMATION_TEST_TABLE: &str = "confirmation-test-table";
const PRESENTS_TEST_TABLE: &str = "presents-test-table";

pub enum TestBackend {
    Mock {
        confirmations: Arc<MockCollectionStore<Confirmation>>,
        presents: Arc<MockCollectionStore<Present>>,
    },
    DynamoDB {
        confirmations: Arc<DynamoCollectionStore<Confirmation>>,
        presents: Arc<DynamoCollectionStore<Present>>,
    },
}

impl TestBackend {
    pub async fn confirmations(&self) -> Vec<Confirmation> {
        match self {
            TestBackend::Mock { confirmations, .. } => confirmations.scan_all().await.unwrap(),
            TestBackend::DynamoDB { confirmations, .. } => confirmations.scan_all().await.unwrap(),
        }
    }

    pub async fn presents(&self) -> Vec<Present> {
        match self {
            TestBackend::Mock { presents, .. } => presents.scan_all().await.unwrap(),
            TestBackend::DynamoDB { presents, .. } => presents.scan_all().await.unwrap(),
        }
    }

    pub async fn seed_confirmation(&self, confirmation: Confirmation) {
        match self {
            TestBackend::Mock { confirmations, .. } => {
                confirmations.insert(confirmation).await.unwrap()
            }
            TestBackend::DynamoDB { confirmations, .. } => {
                confirmations.insert(confirmation).await.unwrap()
            }
        }
    }

    pub async fn seed_present(&self, present: Present) {
        match self {
            TestBackend::Mock { presents, .. } => presents.insert(present).await.unwrap(),
            TestBackend::DynamoDB { presents, .. } => presents.insert(present).await.unwrap(),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub backend: TestBackend,
    pub guest_credential: String,
    pub dashboard_credential: String,
}

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        guest_key: GUEST_KEY.to_string(),
        dashboard_key: DASHBOARD_KEY.to_string(),
        guest_state_key: GUEST_STATE_KEY.to_string(),
        dashboard_state_key: DASHBOARD_STATE_KEY.to_string(),
    }
}

// Helper to set up the test application with the appropriate stores based
// on environment. Credentials are what a client would hold: salted hashes
// of the role secrets.
pub async fn create_test_app() -> TestApp {
    init_test_logging();

    let guest_credential = hash_secret(GUEST_KEY).await.unwrap();
    let dashboard_credential = hash_secret(DASHBOARD_KEY).await.unwrap();

    if use_dynamodb() {
        info!("Using DynamoDB for handler tests");
        let client = create_dynamo_client().await;

        for (table, key) in [
            (CONFIRMATION_TEST_TABLE, Confirmation::KEY_ATTRIBUTE),
            (PRESENTS_TEST_TABLE, Present::KEY_ATTRIBUTE),
        ] {
            debug!("Setting up DynamoDB test table '{}'", table);
            if let Err(e) = create_collection_table(&client, table, key).await {
                // Only log if it's not a table already exists error
                if !format!("{:?}", e).contains("ResourceInUseException") {
                    error!("Error creating table {}: {:?}", table, e);
                } else {
                    info!("Table {} already exists, continuing", table);
                }
            }

            debug!("Clearing DynamoDB test table '{}'", table);
            if let Err(e) = clear_dynamo_table(&client, table, key).await {
                error!("Failed to clear table {}: {:?}", table, e);
            }
        }

        let confirmations = Arc::new(
            DynamoCollectionStore::<Confirmation>::with_client_and_table(
                client.clone(),
                CONFIRMATION_TEST_TABLE.to_string(),
            ),
        );
        let presents = Arc::new(DynamoCollectionStore::<Present>::with_client_and_table(
            client,
            PRESENTS_TEST_TABLE.to_string(),
        ));

        let state = Arc::new(AppState::new(
            test_auth_config(),
            confirmations.clone(),
            presents.clone(),
        ));

        TestApp {
            router: create_router_with_state(state, ""),
            backend: TestBackend::DynamoDB {
                confirmations,
                presents,
            },
            guest_credential,
            dashboard_credential,
        }
    } else {
        debug!("Using mock stores for handler tests");
        let confirmations = Arc::new(MockCollectionStore::<Confirmation>::new());
        let presents = Arc::new(MockCollectionStore::<Present>::new());

        let state = Arc::new(AppState::new(
            test_auth_config(),
            confirmations.clone(),
            presents.clone(),
        ));

        TestApp {
            router: create_router_with_state(state, ""),
            backend: TestBackend::Mock {
                confirmations,
                presents,
            },
            guest_credential,
            dashboard_credential,
        }
    }
}

/// App whose stores fail every operation, for exercising 500 responses.
/// Always mock-backed, regardless of `USE_DYNAMODB`.
pub async fn create_failing_test_app() -> TestApp {
    init_test_logging();

    let guest_credential = hash_secret(GUEST_KEY).await.unwrap();
    let dashboard_credential = hash_secret(DASHBOARD_KEY).await.unwrap();

    let confirmations = Arc::new(MockCollectionStore::<Confirmation>::failing());
    let presents = Arc::new(MockCollectionStore::<Present>::failing());

    let state = Arc::new(AppState::new(
        test_auth_config(),
        confirmations.clone(),
        presents.clone(),
    ));

    TestApp {
        router: create_router_with_state(state, ""),
        backend: TestBackend::Mock {
            confirmations,
            presents,
        },
        guest_credential,
        dashboard_credential,
    }
}
