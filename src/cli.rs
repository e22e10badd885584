use clap::{arg, crate_version, ArgAction, ArgGroup, Command, ValueHint};

pub fn build_cli() -> Command {
    let long_help = "fmkit is always invoked with exactly one of several subcommands.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
create an image:        `fmkit makedisk -f myimg.d77`
show the directory:     `fmkit dir -f myimg.d77 -v`
write a local file:     `fmkit write -f myimg.d77 -s GAME.0BS`
extract a file:         `fmkit read -f myimg.d77 -s GAME -d game`
listing of a program:   `fmkit read -f myimg.d77 -s GAME --decode_basic`
machine code to S-rec:  `fmkit read -f myimg.d77 -s LOADER --srecord`";

    let mut main_cmd = Command::new("fmkit")
        .about("Manipulates D88/D77 disk images for the FM series.")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("dir")
            .arg(
                arg!(-f --file <PATH> "D88/D77 image file")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(-n --image_number <NUM> "image number within the container")
                    .required(false)
                    .default_value("0"),
            )
            .arg(arg!(--original "also show the raw file name bytes").action(ArgAction::SetTrue))
            .arg(arg!(-v --verbose "report the free cluster count").action(ArgAction::SetTrue))
            .about("display the directory of an image"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("read")
            .arg(
                arg!(-f --file <PATH> "D88/D77 image file")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(-n --image_number <NUM> "image number within the container")
                    .required(false)
                    .default_value("0"),
            )
            .arg(arg!(-s --source <NAME> "file name inside the image").required(false))
            .arg(arg!(-i --index <IDX> "directory index of the file to read").required(false))
            .group(ArgGroup::new("target").args(["source", "index"]).required(true))
            .arg(
                arg!(-d --destination <PATH> "output file name stem, extension is added")
                    .value_hint(ValueHint::FilePath)
                    .required(false),
            )
            .arg(arg!(--decode_basic "detokenize an F-BASIC program and emit text").action(ArgAction::SetTrue))
            .arg(arg!(--srecord "emit machine code as Motorola S-records").action(ArgAction::SetTrue))
            .arg(arg!(--json "emit the file record as JSON").action(ArgAction::SetTrue))
            .group(ArgGroup::new("form").args(["decode_basic", "srecord", "json"]).required(false))
            .arg(arg!(-v --verbose "verbose flag").action(ArgAction::SetTrue))
            .about("read a file out of an image"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("write")
            .arg(
                arg!(-f --file <PATH> "D88/D77 image file")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(-n --image_number <NUM> "image number within the container")
                    .required(false)
                    .default_value("0"),
            )
            .arg(
                arg!(-s --source <PATH> "local file to write, extension gives the attributes (e.g. `.0BS`)")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .about("write a local file into an image"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("makedisk")
            .arg(
                arg!(-f --file <PATH> "D88/D77 image file to create")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .about("create a new container with one logically formatted disk"),
    );
    return main_cmd;
}
