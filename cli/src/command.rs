peg::parser!(grammar command() for str {
    rule hex() -> u32
        = quiet!{"0" ['x' | 'X']}? n:$(quiet!{['0'..='9'|'a'..='f'|'A'..='F']+}) {?
            u32::from_str_radix(n, 16).map_err(|_| "32-bit hex number")
        }
        / expected!("hex number")
    rule read() = "read" / "r"
    rule write() = "write" / "w"
    rule print() = "print" / "p" / "dump"
    rule stat() = "stats" / "stat"
    rule help() = "help" / "h" / "?"
    rule quit() = "quit" / "q" / "exit"
    rule command() -> Command
        = read() __ address:hex() { Command::Read(address) }
        / write() __ address:hex() __ value:hex() { Command::Write { address, value } }
        / "show" __ address:hex() { Command::Show(address) }
        / print() { Command::Print }
        / stat() { Command::Stat }
        / help() { Command::Help }
        / quit() { Command::Quit }
        / expected!("command")
    rule comment() = "#" [_]*
    pub(crate) rule parse_command() -> Option<Command>
        = _ c:command()? _ comment()? { c }

    rule ws() = quiet!{[' ' | '\t' | '\r' | '\n']}
        / expected!("whitespace")
    rule _() = ws()*
    rule __() = ws()+
});

pub(crate) use command::parse_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Read(u32),
    Write { address: u32, value: u32 },
    Show(u32),
    Print,
    Stat,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands (numbers are hexadecimal, `0x` optional):
  r, read <addr>             read the byte at <addr>
  w, write <addr> <value>    write the 32-bit <value> to the line of <addr>
  show <addr>                show the line <addr> maps to, valid or not
  p, print, dump             show every valid line
  stat                       show access statistics
  h, help                    show this message
  q, quit, exit              leave";
