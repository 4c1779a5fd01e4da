use std::net::TcpListener;

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    routes::{default_route, findings_route},
    services::LatestScan,
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(default_route::default)
        .service(web::scope("/findings").service(findings_route::latest_findings));
}

pub fn run(listener: TcpListener, latest_scan: Data<LatestScan>) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure_routes)
            .app_data(latest_scan.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
