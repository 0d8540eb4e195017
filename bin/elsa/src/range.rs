use std::net::Ipv4Addr;

/// Every address from `start` to `end`, both included.
pub fn ip_range(start: Ipv4Addr, end: Ipv4Addr) -> impl Iterator<Item = Ipv4Addr> {
    (u32::from(start)..=u32::from(end)).map(Ipv4Addr::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_range() {
        let ips = ip_range(Ipv4Addr::new(10, 0, 0, 254), Ipv4Addr::new(10, 0, 1, 1)).collect::<Vec<_>>();

        assert_eq!(
            ips,
            [
                Ipv4Addr::new(10, 0, 0, 254),
                Ipv4Addr::new(10, 0, 0, 255),
                Ipv4Addr::new(10, 0, 1, 0),
                Ipv4Addr::new(10, 0, 1, 1),
            ]
        );
    }

    #[test]
    fn test_single_address() {
        let ip = Ipv4Addr::new(192, 168, 1, 10);
        assert_eq!(ip_range(ip, ip).collect::<Vec<_>>(), [ip]);
    }

    #[test]
    fn test_reversed_bounds() {
        let start = Ipv4Addr::new(192, 168, 1, 10);
        let end = Ipv4Addr::new(192, 168, 1, 1);
        assert_eq!(ip_range(start, end).count(), 0);
    }
}
