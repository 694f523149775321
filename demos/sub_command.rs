use argtree::{CommandLineParser, Parameter, Scalar, Switch};

fn main() {
    let mut verbose: bool = false;
    let mut port: u16 = 8080;
    let mut host: String = "localhost".to_string();
    let mut force: bool = false;
    let mut target: String = String::default();

    let mut parser = CommandLineParser::new("sub-command");
    parser
        .add(Parameter::option(Switch::new(&mut verbose, true), "-v,--verbose"))
        .expect("Invalid argument parser configuration");

    let mut serve = parser
        .subcommand("serve")
        .expect("Invalid argument parser configuration");
    serve
        .about("Start the server.")
        .add(Parameter::option(Scalar::new(&mut port), "-p,--port").help("The port to bind."))
        .expect("Invalid argument parser configuration");
    serve
        .add(Parameter::option(Scalar::new(&mut host), "--host").env("SUB_COMMAND_HOST"))
        .expect("Invalid argument parser configuration");

    let mut deploy = parser
        .subcommand("deploy")
        .expect("Invalid argument parser configuration");
    deploy
        .about("Deploy to a target.")
        .add(Parameter::option(Switch::new(&mut force, true), "-f,--force"))
        .expect("Invalid argument parser configuration");
    deploy
        .add(Parameter::argument(Scalar::new(&mut target), "TARGET").help("Where to deploy."))
        .expect("Invalid argument parser configuration");

    let root = parser.root();
    parser.command(root).require_subcommand(true);

    parser.parse();
    let path = parser.subcommand_path();
    drop(parser);

    println!("verbose: {verbose}");
    match path.first().map(String::as_str) {
        Some("serve") => println!("Serving on {host}:{port}."),
        Some("deploy") => println!("Deploying to '{target}' (force: {force})."),
        _ => unreachable!("the parser requires one of the sub-commands"),
    }
}
