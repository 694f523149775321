use argtree::{Collection, CommandLineParser, Nargs, Parameter};

fn main() {
    let mut items: Vec<u32> = Vec::default();

    let mut parser = CommandLineParser::new("summer");
    parser
        .about("Sum the items.")
        .add(
            Parameter::argument(Collection::new(&mut items, Nargs::AtLeastOne), "ITEM")
                .help("The items to sum."),
        )
        .expect("Invalid argument parser configuration");

    parser.parse();
    drop(parser);

    let sum: u32 = items.iter().sum();
    println!("Sum: {sum}");
}
