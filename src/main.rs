use collegia::logging::init_tracing;
use collegia::router::init_router;
use collegia::state::init_app_state;
use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    // CLI path: creator accounts are never creatable through the API.
    if args.len() > 1 && args[1] == "create-creator" {
        handle_create_creator(args).await;
        return;
    }

    init_tracing();

    let state = init_app_state().await;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}

async fn handle_create_creator(args: Vec<String>) {
    if args.len() != 5 {
        eprintln!("Usage: {} create-creator <name> <email> <password>", args[0]);
        std::process::exit(1);
    }

    let name = &args[2];
    let email = &args[3];
    let password = &args[4];

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    match collegia::cli::create_creator(&pool, name, email, password).await {
        Ok(_) => {
            println!("✅ Creator account created successfully!");
            println!("   Email: {}", email);
            println!("   Name: {}", name);
        }
        Err(e) => {
            eprintln!("❌ Error creating creator account: {}", e);
            std::process::exit(1);
        }
    }
}
