use notibell::{
    page::{HostPage, PageLocation},
    ws::WebsocketConnector,
    NotificationChannel,
};

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let location: PageLocation = std::env::args()
        .nth(1)
        .ok_or_else(|| {
            println!("Usage: indicator <page url>");
            std::process::exit(1);
        })
        .unwrap()
        .parse()
        .map_err(|err| {
            println!("{}", err);
            std::process::exit(1);
        })
        .unwrap();

    let link = location.messages_link().unwrap();
    let page = HostPage::new(location);

    let mut channel = NotificationChannel::new();
    let mut view = channel.subscribe();

    let events = channel
        .activate(&page, &WebsocketConnector::new())
        .unwrap();

    tokio::spawn(async move {
        while view.changed().await.is_ok() {
            let projection = view.borrow_and_update().clone();
            println!("({}) {}", projection.unread_count, link);
            for err in projection.errors {
                println!("  ! {}", err);
            }
        }
    });

    channel
        .run(events, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
}
