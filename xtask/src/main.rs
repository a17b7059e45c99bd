use xshell::{Cmd, Shell};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sh = &Shell::new()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(|s| &**s).collect();
    match *args {
        ["test"] => {
            cargo(sh)?.args(["test", "--no-default-features"]).run()?;
            cargo(sh)?.args(["test", "--features=async"]).run()?;
            cargo(sh)?.args(["clippy", "--all-features"]).run()?;
            cargo(sh)?.args(["doc", "--all-features"]).run()?;
        }
        ["mutants"] => {
            cargo(sh)?.args(["mutants", "--all-features"]).run()?;
        }
        _ => {
            return Err(format!("invalid arguments: {args:?}").into());
        }
    }

    Ok(())
}

fn cargo(sh: &Shell) -> Result<Cmd<'_>, Box<dyn std::error::Error>> {
    let cargo = std::env::var("CARGO").map_err(|_| "CARGO environment variable not set")?;
    Ok(sh.cmd(cargo))
}
