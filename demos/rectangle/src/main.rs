use shape_ngin::{
    AppConfig,
    demos::rectangle,
    flow::run,
};

fn main() -> anyhow::Result<()> {
    run(
        vec![rectangle::constructor()],
        AppConfig {
            title: "Rectangle".to_string(),
            ..Default::default()
        },
    )
}
