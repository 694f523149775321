use argtree::{Collection, CommandLineParser, Nargs, Parameter, Scalar};

fn main() {
    let mut name: String = "world".to_string();
    let mut greeting: String = "Hello".to_string();
    let mut repeat: usize = 1;
    let mut tags: Vec<String> = Vec::default();

    let mut parser = CommandLineParser::new("config-overlay");
    parser
        .about("Greet someone, with defaults read from an ini file.")
        .footer("Command line values take priority over the configuration file.");
    parser
        .set_config("-c,--config", Some("config_overlay.ini"), false)
        .expect("Invalid argument parser configuration");
    parser
        .add(Parameter::option(Scalar::new(&mut greeting), "-g,--greeting"))
        .expect("Invalid argument parser configuration");
    parser
        .add(Parameter::option(Scalar::new(&mut repeat), "-r,--repeat").env("CONFIG_OVERLAY_REPEAT"))
        .expect("Invalid argument parser configuration");
    parser
        .add(Parameter::option(
            Collection::new(&mut tags, Nargs::Any),
            "-t,--tags",
        ))
        .expect("Invalid argument parser configuration");
    parser
        .add(Parameter::argument(Scalar::new(&mut name), "NAME"))
        .expect("Invalid argument parser configuration");

    parser.parse();
    print!("{}", parser.to_config());
    drop(parser);

    for _ in 0..repeat {
        println!("{greeting}, {name}! {tags:?}");
    }
}
