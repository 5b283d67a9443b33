use cattle_engine::db_types::{NewUserAccount, Role};
use cucumber::given;

use crate::cucumber::{MarketSystem, MarketWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut MarketWorld) {
    let system = MarketSystem::new().await;
    world.system = Some(system);
}

async fn create_account(world: &mut MarketWorld, username: String, role: Role, phone: String) {
    let user = NewUserAccount {
        username: username.clone(),
        password_hash: "not-a-real-hash".into(),
        email: format!("{username}@example.com"),
        first_name: username.clone(),
        last_name: "Test".into(),
        phone,
        address: "Rua das Flores, 1".into(),
        tax_id: None,
        ie: None,
        role,
    };
    world.system().users.register(user).await.expect("Error registering user");
}

#[given(expr = "a farmer account '{word}' with phone {string}")]
async fn farmer_account(world: &mut MarketWorld, username: String, phone: String) {
    create_account(world, username, Role::Farmer, phone).await;
}

#[given(expr = "a buyer account '{word}' with phone {string}")]
async fn buyer_account(world: &mut MarketWorld, username: String, phone: String) {
    create_account(world, username, Role::User, phone).await;
}
