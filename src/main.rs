#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    guest_registration_server::run().await
}
