use nom::{bytes::complete::take_while1, multi::separated_list0, IResult};

pub fn word(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(i)
}

pub fn spaces(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c == ' ' || c == '\t')(i)
}

/// Whitespace-delimited tokens; callers trim the line first.
pub fn tokens(i: &str) -> IResult<&str, Vec<&str>> {
    separated_list0(spaces, word)(i)
}
